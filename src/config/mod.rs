//! Configuration handling for the service.
//!
//! Everything is read from the environment with development defaults, so the
//! binary runs unconfigured on a laptop and picks up real values in a
//! container. `Config::from_env` performs the loading and validates the few
//! numeric knobs.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names. Keeping them public lets tests and deploy
/// tooling refer to them.
pub const ENV_USER_AGENT: &str = "SCRAPE_USER_AGENT";
pub const ENV_CHROME_MAJOR: &str = "CHROME_MAJOR";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_IMAGE_LIMIT: &str = "SCRAPE_IMAGE_LIMIT";
pub const ENV_TIMEOUT_MS: &str = "SCRAPE_TIMEOUT_MS";

/// Default development values used when environment variables are absent.
const DEFAULT_CHROME_MAJOR: u32 = 133;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_IMAGE_LIMIT: usize = 3;
const DEFAULT_TIMEOUT_MS: u64 = 55_000;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    user_agent: String,
    chrome_major: u32,
    bind_addr: String,
    image_limit: usize,
    default_timeout_ms: u64,
}

impl Config {
    /// Create a new config explicitly.
    pub fn new(
        user_agent: impl Into<String>,
        chrome_major: u32,
        bind_addr: impl Into<String>,
        image_limit: usize,
        default_timeout_ms: u64,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            chrome_major,
            bind_addr: bind_addr.into(),
            image_limit,
            default_timeout_ms,
        }
    }

    /// Load from environment variables, falling back to development defaults.
    ///
    /// The User-Agent default is a Chrome-on-Windows string whose major
    /// version tracks `CHROME_MAJOR` so it stays consistent with the headless
    /// browser the image ships with.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chrome_major = match env::var(ENV_CHROME_MAJOR) {
            Ok(raw) => raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                field: ENV_CHROME_MAJOR,
                reason: format!("expected an integer, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_CHROME_MAJOR,
        };

        let user_agent =
            env::var(ENV_USER_AGENT).unwrap_or_else(|_| default_user_agent(chrome_major));

        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let image_limit = match env::var(ENV_IMAGE_LIMIT) {
            Ok(raw) => raw.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                field: ENV_IMAGE_LIMIT,
                reason: format!("expected an integer, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_IMAGE_LIMIT,
        };

        let default_timeout_ms = match env::var(ENV_TIMEOUT_MS) {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: ENV_TIMEOUT_MS,
                reason: format!("expected an integer, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            user_agent,
            chrome_major,
            bind_addr,
            image_limit,
            default_timeout_ms,
        })
    }

    /// User-Agent sent on outbound HTTP requests and spoofed in the browser.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    /// Major version of the headless Chrome build; drives client hints.
    pub fn chrome_major(&self) -> u32 {
        self.chrome_major
    }
    /// TCP bind address (host:port) for the HTTP gateway.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Maximum number of images returned per scrape.
    pub fn image_limit(&self) -> usize {
        self.image_limit
    }
    /// Per-request deadline applied when the caller does not send one.
    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    /// Development defaults (mirrors `from_env` with no env overrides).
    pub fn default() -> Self {
        Self::new(
            default_user_agent(DEFAULT_CHROME_MAJOR),
            DEFAULT_CHROME_MAJOR,
            DEFAULT_BIND_ADDR,
            DEFAULT_IMAGE_LIMIT,
            DEFAULT_TIMEOUT_MS,
        )
    }
}

fn default_user_agent(chrome_major: u32) -> String {
    format!(
        "Mozilla/5.0 (Windows NT 10; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome_major}.0.6943.126 Safari/537.36"
    )
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
