//! Configuration for the relay.
//!
//! Defaults, overridable via environment variables:
//!
//! - `PAD_BIND_ADDR`          (default: "0.0.0.0")
//! - `PAD_PORT`               (default: "3000")   controller connections
//! - `PAD_CONTROL_PORT`       (default: "3001")   `/game/:id`, `/shutdown`, `/status`
//! - `PAD_MAX_CONNECTIONS`    (default: "64")
//! - `PAD_CATALOG_URL`        (default: "http://localhost")
//! - `PAD_DIRECTORY_URL`      (default: same as catalog; "none" disables registration)
//! - `PAD_ADVERTISE_IP`       (default: "127.0.0.1")   address published with the join code
//! - `PAD_FETCH_TIMEOUT_MS`   (default: "5000")
//! - `PAD_REGISTER_ATTEMPTS`  (default: "3")
//! - `PAD_KEY_COMMAND`        (unset: key events are only logged)

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// A configuration variable that is set but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}: {source}")]
    Invalid {
        key: &'static str,
        value: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind both listeners to.
    pub bind_addr: String,

    /// TCP port controllers connect to.
    pub port: u16,

    /// HTTP port for the control endpoints.
    pub control_port: u16,

    /// Maximum number of simultaneously open controller sockets.
    pub max_connections: usize,

    /// Base URL of the game catalog (`{catalog_url}/api/games/{id}`).
    pub catalog_url: String,

    /// Base URL of the directory service, if registration is enabled.
    pub directory_url: Option<String>,

    /// Address players are redirected to by the directory.
    pub advertise_ip: String,

    /// Upper bound on a single catalog fetch.
    pub fetch_timeout: Duration,

    /// How many fresh codes to try when the directory reports a collision.
    pub register_attempts: u32,

    /// External program invoked as `<cmd> press|release <code>`.
    pub key_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            control_port: 3001,
            max_connections: 64,
            catalog_url: "http://localhost".to_string(),
            directory_url: Some("http://localhost".to_string()),
            advertise_ip: "127.0.0.1".to_string(),
            fetch_timeout: Duration::from_millis(5000),
            register_attempts: 3,
            key_command: None,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let catalog_url = env::var("PAD_CATALOG_URL").unwrap_or(defaults.catalog_url);
        let directory_url = match env::var("PAD_DIRECTORY_URL") {
            Ok(url) if url.eq_ignore_ascii_case("none") || url.is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => Some(catalog_url.clone()),
        };

        Ok(Config {
            bind_addr: env::var("PAD_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: read_env_or_default("PAD_PORT", defaults.port)?,
            control_port: read_env_or_default("PAD_CONTROL_PORT", defaults.control_port)?,
            max_connections: read_env_or_default(
                "PAD_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            catalog_url: trim_base(catalog_url),
            directory_url: directory_url.map(trim_base),
            advertise_ip: env::var("PAD_ADVERTISE_IP").unwrap_or(defaults.advertise_ip),
            fetch_timeout: Duration::from_millis(read_env_or_default(
                "PAD_FETCH_TIMEOUT_MS",
                defaults.fetch_timeout.as_millis() as u64,
            )?),
            register_attempts: read_env_or_default(
                "PAD_REGISTER_ATTEMPTS",
                defaults.register_attempts,
            )?
            .max(1),
            key_command: env::var("PAD_KEY_COMMAND").ok().filter(|cmd| !cmd.trim().is_empty()),
        })
    }

    /// `addr:port` for the controller gateway.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// `addr:port` for the control endpoints.
    pub fn control_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.control_port)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn read_env_or_default<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: val,
            source: Box::new(e),
        }),
        Err(_) => Ok(default),
    }
}
