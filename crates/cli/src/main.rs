use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reshoot_core::{
    load_config, load_config_from_env, validate_config, CandidateListing, Config, DiscoveryMode,
    GraphqlMetadataClient, JpegConverter, MetadataClient, Pipeline, RunOutcome, SanitizedConfig,
    Strategy,
};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "reshoot.toml";

#[derive(Debug, Parser)]
#[command(name = "reshoot", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert WebP screenshots and repoint their records (default)
    Run,
    /// List WebP candidates without changing anything
    Scan,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    LocalStore,
    RemoteProbe,
}

impl From<ModeArg> for DiscoveryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::LocalStore => DiscoveryMode::LocalStore,
            ModeArg::RemoteProbe => DiscoveryMode::RemoteProbe,
        }
    }
}

#[derive(Debug, clap::Args)]
struct Overrides {
    /// Configuration file
    #[arg(long, env = "RESHOOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Discovery mode
    #[arg(long, value_enum, global = true)]
    mode: Option<ModeArg>,

    /// Blob store root, bypassing store auto-detection
    #[arg(long, global = true)]
    store_root: Option<PathBuf>,

    /// Convert nothing, report what would be converted
    #[arg(long, global = true)]
    dry_run: bool,

    /// Only list the intended actions
    #[arg(long, global = true)]
    preview: bool,

    /// Delete source files after a successful conversion
    #[arg(long, global = true)]
    delete_original: bool,

    /// JPEG quality (1-100)
    #[arg(long, global = true, allow_negative_numbers = true)]
    quality: Option<i64>,

    /// Stop after this many processed records (0 = unlimited)
    #[arg(long, global = true, allow_negative_numbers = true)]
    batch_limit: Option<i64>,

    /// Write a timestamped report file
    #[arg(long, global = true)]
    report: bool,

    /// Directory for report files
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.discovery.mode = mode.into();
        }
        if let Some(root) = &self.store_root {
            config.store.root = Some(root.clone());
        }
        if let Some(quality) = self.quality {
            config.pipeline.quality = quality;
        }
        if let Some(limit) = self.batch_limit {
            config.pipeline.batch_limit = limit;
        }
        if let Some(dir) = &self.report_dir {
            config.report.dir = dir.clone();
        }
        config.pipeline.dry_run |= self.dry_run;
        config.pipeline.preview_mode |= self.preview;
        config.pipeline.delete_original |= self.delete_original;
        config.pipeline.write_report |= self.report;
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command.as_ref().unwrap_or(&Command::Run) {
        Command::Run => run(&cli.overrides).await,
        Command::Scan => scan(&cli.overrides).await,
    };

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            print_json(&RunOutcome::failed(format!("{:#}", e)));
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize result: {}", e),
    }
}

fn load(overrides: &Overrides) -> Result<Config> {
    let mut config = match &overrides.config {
        Some(path) => read_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => {
            info!("No config file, using defaults and environment");
            load_config_from_env().context("Failed to load config from environment")?
        }
    };

    overrides.apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
}

fn metadata_client(config: &Config) -> Result<Arc<dyn MetadataClient>> {
    let client =
        GraphqlMetadataClient::new(&config.remote).context("Failed to create metadata client")?;
    info!("Metadata endpoint: {}", client.endpoint());
    Ok(Arc::new(client))
}

async fn run(overrides: &Overrides) -> Result<String> {
    let config = load(overrides)?;
    let settings = config
        .pipeline
        .validated()
        .context("Invalid pipeline settings")?;

    let metadata = metadata_client(&config)?;
    let strategy = Strategy::from_config(&config, metadata.clone())
        .context("Failed to set up discovery")?;
    info!(
        "Strategy: {} discovery, {} persistence",
        strategy.discovery.name(),
        strategy.persister.name()
    );

    let pipeline = Pipeline::new(
        settings,
        metadata,
        strategy.discovery,
        Arc::new(JpegConverter::new()),
        strategy.persister,
    )
    .with_report_dir(config.report.dir.clone());

    let report = pipeline.run().await.context("Run failed")?;
    Ok(serde_json::to_string_pretty(&report.into_outcome())?)
}

async fn scan(overrides: &Overrides) -> Result<String> {
    let config = load(overrides)?;
    let metadata = metadata_client(&config)?;
    let strategy =
        Strategy::from_config(&config, metadata.clone()).context("Failed to set up discovery")?;

    // The local walker does not need records; remote probing is driven by them.
    let records = match config.discovery.mode {
        DiscoveryMode::LocalStore => Vec::new(),
        DiscoveryMode::RemoteProbe => metadata
            .list_all_records()
            .await
            .context("Failed to list records")?,
    };

    let listing: CandidateListing = strategy.discovery.list_candidates(&records).await;
    Ok(serde_json::to_string_pretty(&listing)?)
}
