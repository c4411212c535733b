//! CLI entry point for the post activity heatmap.
//!
//! Provides subcommands for rendering engagement/impressions exports as a
//! 12-month calendar heatmap and for normalizing a single export.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use post_heatmap::config::HeatmapConfig;
use post_heatmap::dataset::{DatasetKind, DatasetStore, sample_engagement};
use post_heatmap::fetch::{BasicClient, HttpClient, load_source};
use post_heatmap::normalizer::normalize;
use post_heatmap::output::{print_pretty, print_summary, write_commands, write_records, write_svg};
use post_heatmap::render::{Surface, render};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "post_heatmap")]
#[command(about = "Render post engagement and impressions as a calendar heatmap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a heatmap SVG from engagement and/or impressions exports
    Render {
        /// Engagement CSV (path or URL, optionally gzipped)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        engagement: Option<String>,

        /// Impressions CSV (path or URL, optionally gzipped)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        impressions: Option<String>,

        /// Dataset to display; defaults to the last one loaded
        #[arg(short, long, value_enum)]
        active: Option<DatasetKind>,

        /// Start from the built-in sample engagement data
        #[arg(long, default_value_t = false)]
        sample: bool,

        /// Drawing surface width in pixels
        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        /// Drawing surface height in pixels (grows to fit the calendar)
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// SVG file to write
        #[arg(short, long, default_value = "heatmap.svg")]
        output: String,

        /// Optional: write the drawing commands as JSON
        #[arg(long)]
        commands: Option<String>,

        /// Optional: JSON config overriding layout, palette and calendar window
        #[arg(long)]
        config: Option<String>,
    },
    /// Normalize a single export and report what survived validation
    Normalize {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Which metric the export carries
        #[arg(short, long, value_enum, default_value_t = DatasetKind::Engagement)]
        kind: DatasetKind,

        /// Optional: CSV file to write the normalized records to
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/post_heatmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("post_heatmap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            engagement,
            impressions,
            active,
            sample,
            width,
            height,
            output,
            commands,
            config,
        } => {
            let config = match config {
                Some(path) => HeatmapConfig::load(&path)?,
                None => HeatmapConfig::default(),
            };
            let client = BasicClient::new().context("failed to build HTTP client")?;

            let mut store = DatasetStore::new();
            if sample {
                store.insert(DatasetKind::Engagement, sample_engagement());
            }

            let sources = [
                (DatasetKind::Engagement, engagement),
                (DatasetKind::Impressions, impressions),
            ];
            for (kind, source) in sources {
                if let Some(source) = source {
                    load_into(&mut store, &client, &source, kind).await;
                }
            }

            if let Some(kind) = active {
                if let Err(e) = store.select(kind) {
                    warn!(error = %e, "Keeping the current dataset");
                }
            }

            let Some((kind, records)) = store.active_records() else {
                bail!("no dataset loaded; pass --engagement, --impressions or --sample");
            };

            let heatmap = render(records, Surface::new(width, height), kind, &config)?;

            write_svg(&output, &heatmap)?;
            info!(path = %output, kind = %kind, "Heatmap written");

            if let Some(path) = commands {
                write_commands(&path, &heatmap)?;
                info!(path = %path, "Drawing commands written");
            }
        }
        Commands::Normalize {
            source,
            kind,
            output,
        } => {
            let client = BasicClient::new().context("failed to build HTTP client")?;
            let raw = load_source(&client, &source).await?;
            let records = normalize(&raw, kind)?;

            print_pretty(&records);
            print_summary(&records);

            if let Some(path) = output {
                write_records(&path, &records)?;
                info!(path = %path, "Normalized records written");
            }
        }
    }

    Ok(())
}

/// Loads one export into `store`. Failures are reported and leave the
/// previously loaded data in place.
#[tracing::instrument(skip(store, client))]
async fn load_into<C: HttpClient>(
    store: &mut DatasetStore,
    client: &C,
    source: &str,
    kind: DatasetKind,
) {
    let raw = match load_source(client, source).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, "Error reading file. Please try again.");
            return;
        }
    };

    if let Err(e) = store.load(&raw, kind) {
        error!(error = %e, "Error parsing {kind} CSV");
    }
}
