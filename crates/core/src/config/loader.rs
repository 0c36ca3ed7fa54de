use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides (`RESHOOT_PIPELINE__DRY_RUN=true`).
const ENV_PREFIX: &str = "RESHOOT_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)),
    )
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::from(Serialized::defaults(Config::default())))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(stash_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// The metadata server's own conventional variables.
fn stash_env() -> Env {
    Env::raw()
        .only(&["STASH_URL", "STASH_API_KEY", "STASH_DB_PATH"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("STASH_URL") {
                "remote.url".into()
            } else if key.as_str().eq_ignore_ascii_case("STASH_API_KEY") {
                "remote.api_key".into()
            } else {
                "store.db_path".into()
            }
        })
}
