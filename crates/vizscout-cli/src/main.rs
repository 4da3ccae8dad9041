//! vizscout CLI
//!
//! Finds visual elements of interest (logos, illustrations, icons,
//! diagrams) in rendered PDF pages and optionally asks a vision model to
//! label the best candidates.

mod render;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use render::PdfPageRenderer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vizscout_classify::{HttpVisionClient, NullVisionClient};
use vizscout_core::{ClassifyConfig, DetectionConfig, DocumentAnalysis};
use vizscout_pipeline::{analyze_document, CancelToken, PageRaster};

#[derive(Parser)]
#[command(name = "vizscout")]
#[command(about = "Detect and classify visual elements in PDF pages")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a PDF and write regions, crops and recommendations
    Analyze {
        /// Path to the PDF file
        #[arg(short, long)]
        pdf: PathBuf,

        /// Output directory for analysis.json and crop PNGs
        #[arg(short, long)]
        output: PathBuf,

        /// DPI for page rendering
        #[arg(long, default_value = "150")]
        dpi: u32,

        /// Number of top-ranked candidates sent to classification
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Skip the vision service; candidates keep heuristic scores only
        #[arg(long)]
        no_classify: bool,

        /// Vision model name (overrides VIZSCOUT_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// Show page count and render dimensions for a PDF
    Pages {
        /// Path to the PDF file
        #[arg(short, long)]
        pdf: PathBuf,

        /// DPI used for the dimension preview
        #[arg(long, default_value = "150")]
        dpi: u32,
    },
}

/// Top-level report written to `analysis.json`.
#[derive(Serialize)]
struct RunReport<'a> {
    generated_at: DateTime<Utc>,
    source: String,
    dpi: u32,
    analysis: &'a DocumentAnalysis,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "vizscout=info"
                    .parse()
                    .expect("directive is compile-time constant"),
            ),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Analyze {
            pdf,
            output,
            dpi,
            top_n,
            no_classify,
            model,
        } => analyze(&pdf, &output, dpi, top_n, no_classify, model).await,
        Command::Pages { pdf, dpi } => pages(&pdf, dpi),
    }
}

#[allow(clippy::future_not_send)] // PdfPageRenderer uses pdfium which is not Send
async fn analyze(
    pdf_path: &Path,
    output_dir: &Path,
    dpi: u32,
    top_n: usize,
    no_classify: bool,
    model: Option<String>,
) -> Result<()> {
    let detection = DetectionConfig {
        top_candidates: top_n,
        ..DetectionConfig::default()
    };
    let mut classify = ClassifyConfig::from_env();
    if let Some(model) = model {
        classify.model = model;
    }

    let renderer = PdfPageRenderer::new()?;
    let (rendered, mut render_failures) = renderer.render_pages(pdf_path, dpi)?;
    info!(
        pages = rendered.len(),
        failed = render_failures.len(),
        dpi,
        "rendered {}",
        pdf_path.display()
    );

    let pages: Vec<PageRaster> = rendered
        .into_iter()
        .map(|p| PageRaster {
            page_index: p.page_index,
            image: p.image,
        })
        .collect();

    let cancel = CancelToken::new();
    let mut analysis = if no_classify {
        info!("classification disabled; candidates keep heuristic scores only");
        analyze_document(&pages, &detection, &classify, &NullVisionClient, &cancel).await
    } else {
        let client = HttpVisionClient::from_env(&classify)
            .context("set OPENAI_API_KEY or pass --no-classify")?;
        analyze_document(&pages, &detection, &classify, &client, &cancel).await
    };
    analysis.page_failures.append(&mut render_failures);

    write_outputs(pdf_path, output_dir, dpi, &analysis)?;
    print_summary(&analysis);
    Ok(())
}

fn write_outputs(
    pdf_path: &Path,
    output_dir: &Path,
    dpi: u32,
    analysis: &DocumentAnalysis,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for (rank, crop) in analysis.screenshots.iter().enumerate() {
        if crop.png_data.is_empty() {
            continue;
        }
        let crop_path = output_dir.join(format!(
            "crop_{rank:03}_page{}_{}-{}.png",
            crop.page_index, crop.bbox.x0, crop.bbox.y0
        ));
        std::fs::write(&crop_path, &crop.png_data)
            .with_context(|| format!("Failed to write {}", crop_path.display()))?;
    }

    let report = RunReport {
        generated_at: Utc::now(),
        source: pdf_path.display().to_string(),
        dpi,
        analysis,
    };
    let json_path = output_dir.join("analysis.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!(
        crops = analysis.screenshots.len(),
        "saved analysis to {}",
        output_dir.display()
    );
    Ok(())
}

fn print_summary(analysis: &DocumentAnalysis) {
    let summary = &analysis.analysis_summary;
    println!("Regions: {} total", summary.total_regions);
    println!(
        "  confidence: {} high / {} medium / {} low",
        summary.high_confidence, summary.medium_confidence, summary.low_confidence
    );
    for (method, count) in &summary.by_method {
        println!("  {method}: {count}");
    }
    if !summary.by_graphic_type.is_empty() {
        println!("Classified:");
        for (graphic_type, count) in &summary.by_graphic_type {
            println!("  {graphic_type}: {count}");
        }
    }
    if summary.failed_classifications > 0 {
        println!(
            "Failed classifications: {}",
            summary.failed_classifications
        );
    }
    if !summary.brands.is_empty() {
        println!("Brands: {}", summary.brands.join(", "));
    }

    println!("\nTop recommendations:");
    for (rank, rec) in analysis.recommended_graphics.iter().take(5).enumerate() {
        println!(
            "  {}. page {} {:?} score {:.2} ({})",
            rank + 1,
            rec.region.page_index,
            rec.region.bbox,
            rec.overall_score,
            rec.justification.join("; ")
        );
    }

    for failure in &analysis.page_failures {
        warn!(
            page_index = failure.page_index,
            "page not analyzed: {}", failure.reason
        );
    }
}

fn pages(pdf_path: &Path, dpi: u32) -> Result<()> {
    let renderer = PdfPageRenderer::new()?;
    let count = renderer.page_count(pdf_path)?;
    println!("{}: {count} pages", pdf_path.display());

    let (rendered, failures) = renderer.render_pages(pdf_path, dpi)?;
    println!("| Page | Points | Pixels @ {dpi} DPI |");
    println!("|------|--------|--------------------|");
    for page in &rendered {
        println!(
            "| {} | {:.0}x{:.0} | {}x{} |",
            page.page_index,
            page.width_pts,
            page.height_pts,
            page.image.width(),
            page.image.height()
        );
    }
    for failure in &failures {
        println!("| {} | render failed: {} |", failure.page_index, failure.reason);
    }
    Ok(())
}
