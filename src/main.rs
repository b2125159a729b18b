//! Headless preview: boots the page against the configured catalog, scrolls
//! through it, and writes the resulting markup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use photo_stream::config::Configuration;
use photo_stream::dom::SharedDocument;
use photo_stream::layout;
use photo_stream::markup;
use photo_stream::observer::Viewport;
use photo_stream::page::{Page, SectionStatus};
use photo_stream::tasks::stream::LOADING_HIDE_DELAY;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "photo-stream",
    version,
    about = "Headless preview of the photo stream page"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Override the number of scroll steps
    #[arg(long = "scroll-steps", value_name = "N")]
    scroll_steps: Option<usize>,
    /// Write the page HTML here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Let pending batches land, then lay the page out again and re-run
/// intersection checks against the new geometry.
async fn settle(page: &Page, width: f64) {
    sleep(LOADING_HIDE_DELAY + Duration::from_millis(20)).await;
    let height = layout::layout_page(&mut page.document().lock(), width);
    let delivered = page.viewport().refresh(page.document());
    tracing::debug!(height, delivered, "page settled");
    sleep(Duration::from_millis(20)).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = Configuration::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?
        .validated()
        .context("invalid configuration values")?;
    info!(source = ?cfg.source, "loaded configuration from {}", args.config.display());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let width = cfg.viewport.width;
    let doc = SharedDocument::new(markup::skeleton());
    layout::layout_page(&mut doc.lock(), width);
    let viewport = Viewport::new(width, cfg.viewport.height);

    let page = Page::boot(doc.clone(), cfg.source.catalog(), viewport.clone(), cancel.clone()).await;
    let report = page.report();
    info!(?report, "page booted");
    if report.stream == SectionStatus::Failed && report.gallery == SectionStatus::Failed {
        tracing::warn!("catalog unavailable; writing an empty page");
    }

    let steps = args.scroll_steps.unwrap_or(cfg.preview.scroll_steps);
    for step in 1..=steps {
        settle(&page, width).await;
        if cancel.is_cancelled() {
            break;
        }
        viewport.scroll_by(&doc, cfg.preview.scroll_step);
        info!(step, scroll_y = viewport.scroll_y(), "scrolled");
    }
    settle(&page, width).await;

    let summary = page.summary();
    info!(
        stream_items = summary.stream_items,
        revealed = summary.revealed,
        lightbox_triggers = summary.lightbox_triggers,
        "preview complete"
    );

    let html = {
        let doc = doc.lock();
        doc.to_html(doc.body())
    };
    match &args.output {
        Some(path) => std::fs::write(path, &html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{html}"),
    }

    page.shutdown().await
}
