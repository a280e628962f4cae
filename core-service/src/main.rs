//! AirAware Disease Predictor - Main Entry Point
//!
//! - `serve`: streaming worker (stdio or Kafka), threshold 0.65 by default
//! - `predict`: score one reading and print the top-5 report, threshold 0.4

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use airaware_predictor::config::{Config, TransportKind};
use airaware_predictor::constants;
use airaware_predictor::logic::analysis_loop::{stop_channel, LoopSummary, StopSignal, StreamWorker};
use airaware_predictor::logic::message::parse_reading_value;
use airaware_predictor::logic::model::{load_artifact, ModelContext, RiskThreshold};
use airaware_predictor::logic::predictor::assess;
use airaware_predictor::transport::{LineSink, LineSource};

#[derive(Parser)]
#[command(name = "disease-predictor", version, about = "Air-quality driven disease risk predictor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consume readings and publish predictions until stopped
    Serve {
        /// Model artifact (overrides MODEL_ARTIFACT_PATH)
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Selection threshold (overrides RISK_THRESHOLD)
        #[arg(long)]
        threshold: Option<RiskThreshold>,

        /// Transport (overrides PREDICTOR_TRANSPORT)
        #[arg(long, value_enum)]
        transport: Option<TransportKind>,
    },

    /// Score a single reading and print the report
    Predict {
        /// Model artifact (overrides MODEL_ARTIFACT_PATH)
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Selection threshold
        #[arg(long, default_value_t = RiskThreshold::BATCH)]
        threshold: RiskThreshold,

        /// Reading as inline JSON, e.g. '{"PM2.5": 58, "NO2": 78}'
        #[arg(long, conflicts_with = "input")]
        json: Option<String>,

        /// Reading from a JSON file (stdin when neither is given)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the full assessment as JSON instead of the text report
        #[arg(long)]
        output_json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { artifact, threshold, transport } => serve(artifact, threshold, transport).await,
        Command::Predict { artifact, threshold, json, input, output_json } => {
            predict(artifact, threshold, json, input, output_json)
        }
    }
}

fn load_context(path: &Path) -> Result<Arc<ModelContext>> {
    let ctx = load_artifact(path)
        .with_context(|| format!("failed to load model artifact {}", path.display()))?;
    Ok(Arc::new(ctx))
}

async fn serve(
    artifact: Option<PathBuf>,
    threshold: Option<RiskThreshold>,
    transport: Option<TransportKind>,
) -> Result<()> {
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(path) = artifact {
        config.artifact_path = path;
    }
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    if let Some(transport) = transport {
        config.transport = transport;
    }

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);
    log::info!("  Transport: {}", config.transport);
    log::info!("  Threshold: {}", config.threshold);

    // Fatal: never reach IDLE without a model
    let ctx = load_context(&config.artifact_path)?;

    let (handle, stop) = stop_channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, finishing current message...");
        handle.stop();
    });

    let summary = match config.transport {
        TransportKind::Stdio => {
            StreamWorker::new(ctx, config.threshold, LineSource::stdin(), LineSink::stdout())
                .run(stop)
                .await
        }
        TransportKind::Kafka => run_kafka(ctx, &config, stop).await?,
    };

    log::info!(
        "Disease predictor stopped ({} received, {} published)",
        summary.received,
        summary.published
    );
    Ok(())
}

#[cfg(feature = "kafka")]
async fn run_kafka(ctx: Arc<ModelContext>, config: &Config, stop: StopSignal) -> Result<LoopSummary> {
    use airaware_predictor::transport::kafka::{KafkaSink, KafkaSource};

    let source = KafkaSource::connect(&config.kafka).context("failed to create Kafka consumer")?;
    let sink = KafkaSink::connect(&config.kafka).context("failed to create Kafka producer")?;
    Ok(StreamWorker::new(ctx, config.threshold, source, sink).run(stop).await)
}

#[cfg(not(feature = "kafka"))]
async fn run_kafka(_ctx: Arc<ModelContext>, _config: &Config, _stop: StopSignal) -> Result<LoopSummary> {
    anyhow::bail!("this build has no Kafka support (rebuild with `--features kafka`)")
}

fn predict(
    artifact: Option<PathBuf>,
    threshold: RiskThreshold,
    json: Option<String>,
    input: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    let path = artifact.unwrap_or_else(|| PathBuf::from(constants::get_model_artifact_path()));
    let ctx = load_context(&path)?;

    let raw = match (json, input) {
        (Some(json), _) => json,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read reading from stdin")?;
            buf
        }
    };

    let value: serde_json::Value = serde_json::from_str(&raw).context("reading is not valid JSON")?;
    let (reading, _missing) = parse_reading_value(&value).context("invalid reading")?;

    let assessment = assess(&ctx, &reading, threshold);
    if output_json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", assessment.report());
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
