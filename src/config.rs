use std::env;

use thiserror::Error;
use url::Url;

/// Fallback API key for `Env::Local`. Production refuses to start without `API_KEY`.
pub const LOCAL_API_KEY: &str = "local-development-api-key";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// AppConfig
///
/// Holds the application's configuration, resolved once at startup and immutable afterwards.
/// It is pulled out of the application state via `FromRef`, so the auth gate can read the
/// shared secret without touching the rest of the state.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and secret fallbacks.
    pub env: Env,
    // Where rows live: Postgres in every real deployment, process memory for local runs.
    pub storage: StorageBackend,
    // The single shared secret expected in the `x-api-key` header.
    pub api_key: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Upper bound for the Postgres connection pool.
    pub db_max_connections: u32,
}

/// Env
///
/// Defines the runtime context. `Local` favours readable logs and development defaults,
/// `Production` demands every secret explicitly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// StorageBackend
///
/// Selects the repository implementation constructed by `main`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StorageBackend {
    Postgres { url: String },
    Memory,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("the in-memory storage backend is not allowed in production")]
    MemoryInProduction,
}

impl Default for AppConfig {
    /// Safe values for tests: in-memory storage and the local development key.
    fn default() -> Self {
        Self {
            env: Env::Local,
            storage: StorageBackend::Memory,
            api_key: LOCAL_API_KEY.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the process environment. Fails fast when a variable
    /// required for the current `APP_ENV` is missing or unparsable, so the server never starts
    /// half-configured.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Resolves the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            Some("local") | None => Env::Local,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        let api_key = match (env, lookup("API_KEY")) {
            (_, Some(key)) if !key.is_empty() => key,
            (Env::Production, _) => return Err(ConfigError::Missing("API_KEY")),
            (Env::Local, _) => LOCAL_API_KEY.to_string(),
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            Some("memory") if env == Env::Production => {
                return Err(ConfigError::MemoryInProduction);
            }
            Some("memory") => StorageBackend::Memory,
            Some("postgres") | None => StorageBackend::Postgres {
                url: database_url(&lookup)?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            env,
            storage,
            api_key,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
        })
    }
}

/// Prefers a complete `DATABASE_URL`; otherwise assembles one from the discrete `DB_*` parts.
fn database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
    let port = match lookup("DB_PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: "DB_PORT",
            value: raw,
        })?,
        None => DEFAULT_DB_PORT,
    };
    let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
    let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let password = lookup("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;

    let invalid_host = || ConfigError::Invalid {
        name: "DB_HOST",
        value: host.clone(),
    };

    // `Url` percent-encodes the credentials, so `@`, `/` or `#` in a password stay inside it.
    let mut url = Url::parse(&format!("postgres://{host}:{port}")).map_err(|_| invalid_host())?;
    url.set_username(&user).map_err(|_| invalid_host())?;
    url.set_password(Some(&password)).map_err(|_| invalid_host())?;
    url.set_path(&format!("/{name}"));

    Ok(url.to_string())
}
