use std::fmt;
use std::time::Duration;

use steam_exporter_client::SteamWebApiOptions;
use steam_exporter_core::collector::{CollectorKind, UnknownCollector};
use steam_exporter_core::emitter::EmitterSettings;
use steam_exporter_core::types::AccountId;

const DEFAULT_COLLECTORS: &str = "playtime,price,process";

/// Startup configuration errors. Any of these aborts the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("STEAM_IDS contains no valid SteamID")]
    NoAccounts,

    #[error("STEAM_COLLECTORS must name at least one collector")]
    NoCollectors,

    #[error(transparent)]
    UnknownCollector(#[from] UnknownCollector),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `6630`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `300`). A cold scrape of a
    /// large library can take minutes.
    pub request_timeout_secs: u64,
    pub exporter: ExporterConfig,
}

/// What to scrape and how long to trust it.
#[derive(Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub api_key: String,
    /// Tracked accounts, deduplicated, in configuration order.
    pub accounts: Vec<AccountId>,
    /// Active collectors, deduplicated, in configuration order.
    pub collectors: Vec<CollectorKind>,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub retry_ttl_secs: u64,
    pub store_country: String,
    pub language: String,
}

impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("api_key", &"<redacted>")
            .field("accounts", &self.accounts)
            .field("collectors", &self.collectors)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("retry_ttl_secs", &self.retry_ttl_secs)
            .field("store_country", &self.store_country)
            .field("language", &self.language)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `STEAM_API_KEY`         | required                   |
    /// | `STEAM_IDS`             | required                   |
    /// | `STEAM_COLLECTORS`      | `playtime,price,process`   |
    /// | `HOST`                  | `127.0.0.1`                |
    /// | `PORT`                  | `6630`                     |
    /// | `REQUEST_TIMEOUT_SECS`  | `300`                      |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                       |
    /// | `CACHE_TTL_SECS`        | `86400`                    |
    /// | `RETRY_TTL_SECS`        | `3600`                     |
    /// | `STEAM_STORE_COUNTRY`   | `de`                       |
    /// | `STEAM_LANGUAGE`        | `english`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = parse_or(&var, "PORT", 6630, "a valid u16")?;
        let request_timeout_secs =
            parse_or(&var, "REQUEST_TIMEOUT_SECS", 300, "a whole number of seconds")?;

        let api_key = var("STEAM_API_KEY").ok_or(ConfigError::Missing("STEAM_API_KEY"))?;
        let accounts = parse_accounts(&var("STEAM_IDS").ok_or(ConfigError::Missing("STEAM_IDS"))?)?;
        let collectors = var("STEAM_COLLECTORS").unwrap_or_else(|| DEFAULT_COLLECTORS.into());
        let collectors = parse_collectors(&collectors)?;

        let exporter = ExporterConfig {
            api_key: api_key.trim().to_string(),
            accounts,
            collectors,
            upstream_timeout_secs: parse_or(
                &var,
                "UPSTREAM_TIMEOUT_SECS",
                30,
                "a whole number of seconds",
            )?,
            cache_ttl_secs: parse_or(&var, "CACHE_TTL_SECS", 86_400, "a whole number of seconds")?,
            retry_ttl_secs: parse_or(&var, "RETRY_TTL_SECS", 3_600, "a whole number of seconds")?,
            store_country: var("STEAM_STORE_COUNTRY").unwrap_or_else(|| "de".into()),
            language: var("STEAM_LANGUAGE").unwrap_or_else(|| "english".into()),
        };

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            exporter,
        })
    }
}

impl ExporterConfig {
    pub fn process_enabled(&self) -> bool {
        self.collectors.contains(&CollectorKind::Process)
    }

    pub fn emitter_settings(&self) -> EmitterSettings {
        EmitterSettings {
            accounts: self.accounts.clone(),
            collectors: self.collectors.clone(),
            fresh_ttl: Duration::from_secs(self.cache_ttl_secs),
            retry_ttl: Duration::from_secs(self.retry_ttl_secs),
            upstream_timeout: Some(Duration::from_secs(self.upstream_timeout_secs)),
        }
    }

    pub fn client_options(&self) -> SteamWebApiOptions {
        SteamWebApiOptions {
            country: self.store_country.clone(),
            language: self.language.clone(),
            ..SteamWebApiOptions::default()
        }
    }
}

fn parse_or<T, F>(
    var: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

/// Parse a comma-separated SteamID list. Entries that are not 64-bit ids
/// are logged and skipped; duplicates are dropped.
fn parse_accounts(raw: &str) -> Result<Vec<AccountId>, ConfigError> {
    let mut accounts = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.parse::<AccountId>() {
            Ok(id) if !accounts.contains(&id) => accounts.push(id),
            Ok(id) => tracing::warn!(steam_id = id, "Duplicate SteamID ignored"),
            Err(_) => tracing::warn!(entry, "Skipping unparsable SteamID"),
        }
    }
    if accounts.is_empty() {
        return Err(ConfigError::NoAccounts);
    }
    Ok(accounts)
}

/// Parse a comma-separated collector list. `go` is accepted for
/// compatibility with existing deployments and ignored.
fn parse_collectors(raw: &str) -> Result<Vec<CollectorKind>, ConfigError> {
    let mut collectors = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if entry.eq_ignore_ascii_case("go") {
            tracing::warn!(collector = entry, "Go runtime collector is not available, ignoring");
            continue;
        }
        let kind: CollectorKind = entry.parse()?;
        if !collectors.contains(&kind) {
            collectors.push(kind);
        }
    }
    if collectors.is_empty() {
        return Err(ConfigError::NoCollectors);
    }
    Ok(collectors)
}
