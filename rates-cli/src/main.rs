//! # Rates CLI
//!
//! Binary that wires together all the components:
//! - Load configuration from environment (and `.env`)
//! - Initialize the provider adapter and the quote cache
//! - Create the rate service
//! - Run one command and print its result

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_adapters::{CurrencyApi, HttpPublisher, LocalPublisher};
use rates_chart::{ChartRenderer, Rasterizer};
use rates_hex::{GraphPipeline, QuoteCache, RateService};
use rates_types::{CurrencyCode, GraphPublisher};

use config::Config;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Currency conversion, comparison and charts", long_about = None)]
struct Cli {
    /// Base URL of the currency-api files (overrides RATES_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Directory rendered charts are written to (overrides GRAPH_DIR)
    #[arg(long)]
    graph_dir: Option<PathBuf>,

    /// TrueType font used for chart text (overrides GRAPH_FONT_PATH)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Upload endpoint for charts (overrides GRAPH_UPLOAD_URL)
    #[arg(long)]
    upload_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "RATES_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        /// Source currency code
        from: String,
        /// Target currency code (defaults to DEFAULT_REFERENCE)
        to: Option<String>,
    },
    /// Compare a currency against a reference over 24h, 1w, 1m and 3m
    Scheme {
        /// Currency code
        code: String,
        #[arg(long)]
        reference: Option<String>,
    },
    /// Chart up to six currencies against a reference over three months
    Graph {
        /// Currency codes
        #[arg(required = true, num_args = 1..)]
        codes: Vec<String>,
        #[arg(long)]
        reference: Option<String>,
    },
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.graph_dir {
            config.graph_dir = dir.clone();
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        if let Some(url) = &self.upload_url {
            config.upload_url = Some(url.clone());
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rates_hex=debug,rates_adapters=debug".into());

    // results go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn print<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn reference_or_default(reference: Option<String>, config: &Config) -> CurrencyCode {
    reference
        .map(CurrencyCode::new)
        .unwrap_or_else(|| config.default_reference.clone())
}

async fn run_graph<P: GraphPublisher>(
    service: &RateService<CurrencyApi>,
    codes: &[CurrencyCode],
    reference: CurrencyCode,
    pipeline: GraphPipeline<P>,
    json: bool,
) -> Result<()> {
    let today = chrono::Utc::now().date_naive();
    let report = service
        .scheme_graph(codes, reference, today, &pipeline)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.url);
    if !report.skipped.is_empty() {
        let skipped: Vec<&str> = report.skipped.iter().map(CurrencyCode::as_str).collect();
        println!("No result for: {}", skipped.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    info!("Using rate provider {}", config.api_url);

    let service = RateService::new(
        CurrencyApi::new(&config.api_url),
        Arc::new(QuoteCache::new()),
    );

    match cli.command {
        Commands::Convert { amount, from, to } => {
            let to = reference_or_default(to, &config);
            let conversion = service
                .convert(amount, CurrencyCode::new(from), to)
                .await?;
            print(&conversion, cli.json)?;
        }

        Commands::Scheme { code, reference } => {
            let reference = reference_or_default(reference, &config);
            let today = chrono::Utc::now().date_naive();
            let report = service
                .scheme(CurrencyCode::new(code), reference, today)
                .await?;
            print(&report, cli.json)?;
        }

        Commands::Graph { codes, reference } => {
            let reference = reference_or_default(reference, &config);
            let codes: Vec<CurrencyCode> = codes.into_iter().map(CurrencyCode::new).collect();

            let rasterizer = Rasterizer::discover(config.font_path.as_deref())?;
            let renderer = ChartRenderer::new(&config.graph_dir, rasterizer);

            match &config.upload_url {
                Some(endpoint) => {
                    let pipeline = GraphPipeline::new(renderer, HttpPublisher::new(endpoint));
                    run_graph(&service, &codes, reference, pipeline, cli.json).await?;
                }
                None => {
                    let mut publisher = LocalPublisher::new();
                    if let Some(dir) = &config.public_dir {
                        publisher = publisher.with_public_dir(dir);
                    }
                    if let Some(url) = &config.public_url {
                        publisher = publisher.with_public_url(url);
                    }
                    let pipeline = GraphPipeline::new(renderer, publisher);
                    run_graph(&service, &codes, reference, pipeline, cli.json).await?;
                }
            }
        }
    }

    Ok(())
}
