use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contentforge_core::{Blackboard, ProductInput};
use events::EventBus;
use orchestrator::workers::{ComparisonWorker, ExtractionWorker, FaqWorker, ValidationWorker};
use orchestrator::{EngineConfig, PipelineEngine, Worker};
use provider::{CircuitBreaker, GatedProvider, GenerationBackend, HttpBackend, RetryPolicy, RuleBackend};

const CONFIG_FILE: &str = "contentforge.toml";
const API_KEY_ENV: &str = "CONTENTFORGE_API_KEY";

#[derive(Parser)]
#[command(name = "contentforge")]
#[command(about = "Multi-stage content generation pipeline for product pages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file to the current directory
    Init,
    /// Run the pipeline against a product input file
    Run {
        /// Product input JSON file
        product: PathBuf,

        /// Optional rival product JSON file for the comparison section
        #[arg(long)]
        compare: Option<PathBuf>,

        /// Print the event log after the run
        #[arg(long)]
        events: bool,

        /// Print the step history after the run
        #[arg(long)]
        history: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Config {
    #[serde(default)]
    pipeline: PipelineConfig,
    #[serde(default)]
    provider: ProviderConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct PipelineConfig {
    max_steps: u32,
    max_retries: u32,
    min_faq: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: 20,
            max_retries: 3,
            min_faq: 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProviderConfig {
    /// Chat-completions base URL; offline rule generation when unset
    base_url: Option<String>,
    model: Option<String>,
    max_attempts: u32,
    base_delay_ms: u64,
    failure_threshold: u32,
    reset_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: Some("https://api.mistral.ai".to_string()),
            model: None,
            max_attempts: 3,
            base_delay_ms: 500,
            failure_threshold: 3,
            reset_timeout_secs: 60,
        }
    }
}

impl Config {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contentforge=info,orchestrator=info,provider=info".into()),
        )
        .init();
}

fn load_product(path: &Path) -> Result<ProductInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid product in {}", path.display()))
}

/// Remote backend gated by breaker and retry when a base URL and API key
/// are configured; pure rule generation otherwise.
fn build_backend(config: &ProviderConfig, bus: &EventBus) -> Result<Arc<dyn GenerationBackend>> {
    let api_key = std::env::var(API_KEY_ENV).ok();

    let (Some(base_url), Some(api_key)) = (&config.base_url, api_key) else {
        tracing::info!("No remote endpoint configured, using rule-based generation");
        return Ok(Arc::new(RuleBackend::new()));
    };

    let mut remote = HttpBackend::new(base_url, api_key)?;
    if let Some(model) = &config.model {
        remote = remote.with_model(model);
    }

    let breaker = Arc::new(CircuitBreaker::with_settings(
        config.failure_threshold,
        Duration::from_secs(config.reset_timeout_secs),
    ));
    let gated = GatedProvider::new(Arc::new(remote))
        .with_fallback(Arc::new(RuleBackend::new()))
        .with_breaker(breaker)
        .with_retry_policy(RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        ))
        .with_event_bus(bus.clone());
    Ok(Arc::new(gated))
}

async fn run_pipeline(
    config: Config,
    product_path: &Path,
    compare_path: Option<&Path>,
    show_events: bool,
    show_history: bool,
) -> Result<()> {
    let product = load_product(product_path)?;
    let mut board = Blackboard::new(product);
    if let Some(path) = compare_path {
        board = board.with_comparison(load_product(path)?);
    }

    let bus = EventBus::new();
    let backend = build_backend(&config.provider, &bus)?;

    let workers: Vec<Box<dyn Worker>> = vec![
        Box::new(ExtractionWorker::new()),
        Box::new(FaqWorker::new(backend, config.pipeline.min_faq)),
        Box::new(ComparisonWorker::new()),
        Box::new(ValidationWorker::new(config.pipeline.min_faq)),
    ];

    let engine = PipelineEngine::new(workers)
        .with_config(
            EngineConfig::new()
                .with_max_steps(config.pipeline.max_steps)
                .with_max_retries(config.pipeline.max_retries)
                .with_min_faq(config.pipeline.min_faq),
        )
        .with_event_bus(bus.clone());

    let outcome = engine.run(board).await;

    println!("{}", serde_json::to_string_pretty(&outcome.blackboard.content)?);

    if show_history {
        println!("{}", serde_json::to_string_pretty(&outcome.blackboard.history)?);
    }
    if show_events {
        println!("{}", serde_json::to_string_pretty(&bus.recent())?);
    }

    match outcome.failure {
        None => {
            println!(
                "Run {} completed: {} FAQ entries, {} retries",
                outcome.blackboard.trace_id,
                outcome.blackboard.content.faq.len(),
                outcome.blackboard.retry_count,
            );
            Ok(())
        }
        Some(failure) => bail!("run failed ({}): {}", failure.kind.as_str(), failure.message),
    }
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    let config = Config::default();
    std::fs::write(path, toml::to_string_pretty(&config)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_config(&cli.config),
        Commands::Run {
            product,
            compare,
            events,
            history,
        } => {
            let config = Config::load(&cli.config)?;
            run_pipeline(config, &product, compare.as_deref(), events, history).await
        }
    }
}
