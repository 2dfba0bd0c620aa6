/// Configuration for the API server
///
/// Loaded from environment variables, with a `.env` file honored in
/// development.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `REQUEST_TIMEOUT_SECONDS`: Per-request deadline (default: 30)
/// - `DATABASE_URL`: PostgreSQL connection string (required; `DB_CONNSTRING`
///   is accepted as a fallback)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `TOKEN_TTL_SECONDS`: Access token lifetime (default: 3600)
/// - `TOKEN_PURGE_INTERVAL_SECONDS`: Expired token sweep cadence (default: 3600)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use chainstack_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of issued access tokens
    pub token_ttl_seconds: u64,

    /// How often expired tokens are purged
    pub purge_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_seconds: 30,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
            },
            auth: AuthConfig {
                token_ttl_seconds: 3600,
                purge_interval_seconds: 3600,
            },
        }
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing, a numeric variable does
    /// not parse, or a duration is zero.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB_CONNSTRING"))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let config = Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or(defaults.api.host),
                port: parse_var(&lookup, "API_PORT", defaults.api.port)?,
                request_timeout_seconds: parse_var(
                    &lookup,
                    "REQUEST_TIMEOUT_SECONDS",
                    defaults.api.request_timeout_seconds,
                )?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            auth: AuthConfig {
                token_ttl_seconds: parse_var(
                    &lookup,
                    "TOKEN_TTL_SECONDS",
                    defaults.auth.token_ttl_seconds,
                )?,
                purge_interval_seconds: parse_var(
                    &lookup,
                    "TOKEN_PURGE_INTERVAL_SECONDS",
                    defaults.auth.purge_interval_seconds,
                )?,
            },
        };

        if config.api.request_timeout_seconds == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be positive");
        }
        if config.auth.token_ttl_seconds == 0 {
            anyhow::bail!("TOKEN_TTL_SECONDS must be positive");
        }
        if config.auth.purge_interval_seconds == 0 {
            anyhow::bail!("TOKEN_PURGE_INTERVAL_SECONDS must be positive");
        }

        Ok(config)
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.token_ttl_seconds)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.auth.purge_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_seconds)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        None => Ok(default),
    }
}
