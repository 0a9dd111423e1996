use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ttsgen_core::settings::SettingsManager;
use ttsgen_core::topics::load_topics;
use ttsgen_core::{
    ExhaustionPolicy, GeminiServiceFactory, GenderStrategy, RunDriver, SamplePipeline,
};

#[derive(Parser, Debug)]
#[command(name = "ttsgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate a labeled synthetic speech dataset")]
struct Args {
    /// API keys, tried in order as each one runs out of quota
    #[arg(required = true, value_name = "API_KEY")]
    api_keys: Vec<String>,

    /// JSON array of topics to explain
    #[arg(long, default_value = "data/topics.json")]
    topics: PathBuf,

    /// Dataset root; audio goes to <output>/audio
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Number of samples to request
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// TOML settings file
    #[arg(long, default_value = "ttsgen.toml")]
    config: PathBuf,

    /// Gender labeling strategy: static, validated or classifier
    #[arg(long)]
    strategy: Option<GenderStrategy>,

    /// Start over from the first key instead of stopping when all keys hit quota
    #[arg(long)]
    wrap_credentials: bool,

    /// Seed for reproducible voice, style and topic choices
    #[arg(long)]
    seed: Option<u64>,

    /// Use this voice for every sample
    #[arg(long, value_name = "NAME")]
    voice: Option<String>,

    /// Use this style for every sample
    #[arg(long)]
    style: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args.output)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    info!(
        "CLI startup: keys={}, count={}, output={:?}, config={:?}",
        args.api_keys.len(),
        args.count,
        args.output,
        args.config
    );

    let mut settings_manager = SettingsManager::from_path(args.config.clone())?;
    settings_manager.update_setting(|settings| {
        if let Some(strategy) = args.strategy {
            settings.gender_strategy = strategy;
        }
        if args.wrap_credentials {
            settings.exhaustion_policy = ExhaustionPolicy::WrapAround;
        }
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
    });
    let settings = settings_manager.settings().clone();

    let topics = load_topics(&args.topics)?;
    info!("Loaded {} topics", topics.len());

    let mut pipeline = SamplePipeline::builder()
        .output_dir(&args.output)
        .services(GeminiServiceFactory::from_settings(&settings))
        .settings(settings)
        .credentials(args.api_keys)
        .build()?;

    let summary = RunDriver::new(&mut pipeline)
        .with_voice(args.voice)
        .with_style(args.style)
        .run(&topics, args.count)
        .await?;

    println!(
        "Generated {}/{} samples into {} ({} skipped)",
        summary.succeeded,
        summary.requested,
        args.output.display(),
        summary.failed
    );
    Ok(())
}

fn setup_tracing(output: &Path) -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {output:?}"))?;

    let log_file = output.join("ttsgen.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
