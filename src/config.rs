use std::{env, fmt, fs, path::Path, path::PathBuf};

use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const LOCAL_DB_DIR: &str = "db";
pub const LOCAL_LEDGER_DB_FILE: &str = "popularity.db";

const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_TRENDING_LIMIT: usize = 5;
const DEFAULT_POSTER_WORKERS: usize = 6;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();
static CREDENTIAL: OnceCell<Result<Credential, ConfigError>> = OnceCell::new();

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no TMDB API key configured (set TMDB_API_KEY or `tmdb_api_key` in config.json)")]
    MissingCredential,
    #[error("TMDB API key contains characters that cannot be sent in a header")]
    InvalidCredential,
}

/// Bearer token for the movie catalog. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ConfigError::InvalidCredential);
        }
        Ok(Self(token))
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub image_base_url: String,
    pub ledger_db_path: PathBuf,
    pub debounce_ms: u64,
    pub trending_limit: usize,
    pub poster_workers: usize,
    pub request_timeout_secs: u64,
    pub tmdb_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            ledger_db_path: local_ledger_db_path(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            poster_workers: DEFAULT_POSTER_WORKERS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            tmdb_api_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    image_base_url: Option<String>,
    #[serde(alias = "db_path")]
    ledger_db_path: Option<String>,
    debounce_ms: Option<u64>,
    trending_limit: Option<usize>,
    poster_workers: Option<usize>,
    request_timeout_secs: Option<u64>,
    tmdb_api_key: Option<String>,
}

/// Process-wide configuration, read from `config.json` on first use.
pub fn config() -> &'static AppConfig {
    CONFIG.get_or_init(load_config)
}

/// Process-wide catalog credential. `TMDB_API_KEY` wins over `config.json`.
pub fn credential() -> Result<Credential, ConfigError> {
    CREDENTIAL
        .get_or_init(|| resolve_credential(env::var(API_KEY_ENV).ok(), config()))
        .clone()
}

pub fn resolve_credential(
    env_value: Option<String>,
    cfg: &AppConfig,
) -> Result<Credential, ConfigError> {
    let from_env = env_value.filter(|v| !v.trim().is_empty());
    match from_env.or_else(|| cfg.tmdb_api_key.clone()) {
        Some(token) => Credential::new(token),
        None => Err(ConfigError::MissingCredential),
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(Path::new("config.json"))
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    match fs::read_to_string(cfg_path) {
        Ok(raw) => match parse_config(&raw) {
            Ok(cfg) => {
                info!("Loaded config from {}", cfg_path.display());
                cfg
            }
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Using defaults.",
                    cfg_path.display(),
                    err
                );
                AppConfig::default()
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
            AppConfig::default()
        }
    }
}

pub fn parse_config(raw: &str) -> Result<AppConfig, serde_json::Error> {
    let parsed = serde_json::from_str::<RawConfig>(raw)?;
    let mut cfg = AppConfig::default();

    if let Some(url) = parsed.api_base_url.filter(|u| !u.trim().is_empty()) {
        cfg.api_base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(url) = parsed.image_base_url.filter(|u| !u.trim().is_empty()) {
        cfg.image_base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(path) = parsed.ledger_db_path.filter(|p| !p.trim().is_empty()) {
        cfg.ledger_db_path = PathBuf::from(path);
    }
    if let Some(ms) = parsed.debounce_ms {
        cfg.debounce_ms = ms;
    }
    if let Some(limit) = parsed.trending_limit {
        if limit == 0 {
            warn!("trending_limit must be positive; keeping {}", cfg.trending_limit);
        } else {
            cfg.trending_limit = limit;
        }
    }
    if let Some(n) = parsed.poster_workers {
        cfg.poster_workers = n.clamp(1, 16);
    }
    if let Some(secs) = parsed.request_timeout_secs {
        if secs == 0 {
            warn!(
                "request_timeout_secs must be positive; keeping {}",
                cfg.request_timeout_secs
            );
        } else {
            cfg.request_timeout_secs = secs;
        }
    }
    cfg.tmdb_api_key = parsed.tmdb_api_key.filter(|k| !k.trim().is_empty());

    Ok(cfg)
}

pub fn local_ledger_db_path() -> PathBuf {
    PathBuf::from(LOCAL_DB_DIR).join(LOCAL_LEDGER_DB_FILE)
}
