use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Remote metadata store (GraphQL endpoint) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Base URL of the metadata server (e.g., "http://localhost:9999")
    #[serde(default = "default_remote_url")]
    pub url: String,
    /// API key, sent as an `ApiKey` header when non-empty
    #[serde(default)]
    pub api_key: String,
    /// Path of the GraphQL endpoint below `url`
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            api_key: String::new(),
            graphql_path: default_graphql_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Full URL of the GraphQL endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.graphql_path.trim_start_matches('/')
        )
    }
}

fn default_remote_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// How assets are located and where converted screenshots are written.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Walk the local blob store; repoint records at a JPEG written beside the source.
    #[default]
    LocalStore,
    /// Fetch each screenshot URL; upload the JPEG inline as a data URI.
    RemoteProbe,
}

impl DiscoveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalStore => "local_store",
            Self::RemoteProbe => "remote_probe",
        }
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default)]
    pub mode: DiscoveryMode,
}

/// Local content store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Explicit blob store root. Wins over everything else.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Data directory whose `blobs/` child is the store root.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Data directories probed in order when neither override is set.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            db_path: None,
            fallbacks: default_fallbacks(),
        }
    }
}

fn default_fallbacks() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dirs) = directories::BaseDirs::new() {
        let home = dirs.home_dir();
        paths.push(home.join(".stash"));
        paths.push(home.join("AppData").join("Roaming").join("Stash"));
    }
    paths.push(PathBuf::from("/opt/stash"));
    paths
}

/// Raw pipeline options as they appear in the config file.
///
/// Integers are signed so that out-of-range values reach validation instead of
/// failing deserialization with an opaque message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub delete_original: bool,
    #[serde(default = "default_quality")]
    pub quality: i64,
    #[serde(default)]
    pub convert_only_missing: bool,
    #[serde(default)]
    pub rebuild_paths_only: bool,
    #[serde(default)]
    pub skip_multi_image: bool,
    /// 0 = unlimited
    #[serde(default)]
    pub batch_limit: i64,
    #[serde(default)]
    pub write_report: bool,
    #[serde(default)]
    pub preview_mode: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            delete_original: false,
            quality: default_quality(),
            convert_only_missing: false,
            rebuild_paths_only: false,
            skip_multi_image: false,
            batch_limit: 0,
            write_report: false,
            preview_mode: false,
        }
    }
}

fn default_quality() -> i64 {
    90
}

/// Report artifact configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_dir")]
    pub dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: default_report_dir(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub remote: SanitizedRemoteConfig,
    pub discovery: DiscoveryConfig,
    pub store: StoreConfig,
    pub pipeline: PipelineSettings,
    pub report: ReportConfig,
}

/// Sanitized remote config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteConfig {
    pub url: String,
    pub graphql_path: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            remote: SanitizedRemoteConfig {
                url: config.remote.url.clone(),
                graphql_path: config.remote.graphql_path.clone(),
                api_key_configured: !config.remote.api_key.is_empty(),
                timeout_secs: config.remote.timeout_secs,
            },
            discovery: config.discovery.clone(),
            store: config.store.clone(),
            pipeline: config.pipeline.clone(),
            report: config.report.clone(),
        }
    }
}
