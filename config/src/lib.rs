//! Configuration for the splash demo.
//!
//! ```toml
//! [splash]
//! duration_ms = 2500
//!
//! [fetch]
//! url = "https://example.com/banner.png"
//! timeout_seconds = 10
//! max_download_bytes = 5242880
//! user_agent = "splash/0.0"
//! ```
//!
//! The file lives at `~/.splash/config.toml`. A missing file is not an error;
//! every field falls back to a default. `SPLASH_DURATION_MS` and
//! `SPLASH_FETCH_URL` override the file, and string values expand `${VAR}`.

use std::{env, fs, io, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use toml::de;

use splash_fetch::HttpFetcherConfig;
use splash_types::{DEFAULT_SPLASH_DURATION, MIN_SPLASH_DURATION};

pub const DURATION_ENV: &str = "SPLASH_DURATION_MS";
pub const FETCH_URL_ENV: &str = "SPLASH_FETCH_URL";

#[derive(Debug, Default, Deserialize)]
pub struct SplashConfig {
    pub splash: Option<SplashSection>,
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SplashSection {
    /// Transition delay in milliseconds. Default: 2500.
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchConfig {
    /// Asset to download while the splash is up. Empty or absent disables the fetch.
    pub url: Option<String>,
    pub timeout_seconds: Option<u32>,
    pub max_download_bytes: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Expand `${VAR}` references. Unset variables become empty strings.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".splash").join("config.toml"))
}

impl SplashConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {}", path.display(), source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {}", path.display(), source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Fetch settings after defaults, overrides and expansion are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub url: String,
    pub http: HttpFetcherConfig,
}

/// Fully resolved settings: no `Option` handling past this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplashSettings {
    pub duration: Duration,
    pub fetch: Option<FetchSettings>,
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_SPLASH_DURATION,
            fetch: None,
        }
    }
}

impl SplashSettings {
    /// Resolve against the process environment.
    #[must_use]
    pub fn resolve(config: Option<&SplashConfig>) -> Self {
        Self::resolve_with(config, |key| env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(
        config: Option<&SplashConfig>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file_duration = config
            .and_then(|c| c.splash.as_ref())
            .and_then(|s| s.duration_ms);
        let env_duration = lookup(DURATION_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(_) => {
                tracing::warn!("Ignoring invalid {DURATION_ENV}={raw}");
                None
            }
        });
        let duration = env_duration
            .or(file_duration)
            .map_or(DEFAULT_SPLASH_DURATION, Duration::from_millis)
            .max(MIN_SPLASH_DURATION);

        let fetch_config = config.and_then(|c| c.fetch.as_ref());
        let url = lookup(FETCH_URL_ENV)
            .or_else(|| fetch_config.and_then(|f| f.url.clone()))
            .map(|raw| expand_env_vars(&raw).trim().to_string())
            .filter(|url| !url.is_empty());

        let fetch = url.map(|url| {
            let mut http = HttpFetcherConfig::default();
            if let Some(f) = fetch_config {
                if let Some(secs) = f.timeout_seconds {
                    http.timeout = Duration::from_secs(u64::from(secs.max(1)));
                }
                if let Some(bytes) = f.max_download_bytes {
                    http.max_download_bytes = bytes;
                }
                if let Some(agent) = f.user_agent.as_deref() {
                    let agent = expand_env_vars(agent);
                    if !agent.trim().is_empty() {
                        http.user_agent = agent.trim().to_string();
                    }
                }
            }
            FetchSettings { url, http }
        });

        Self { duration, fetch }
    }
}
