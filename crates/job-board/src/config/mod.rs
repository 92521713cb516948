use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::applications::{Locale, StatusVocabulary};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend: BackendConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the job board REST backend lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub status_vocabulary: StatusVocabulary,
    pub locale: Locale,
}

impl BackendConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("JOB_BOARD_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBackendUrl(base_url));
        }

        let timeout_secs = env::var("JOB_BOARD_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let status_vocabulary = match env::var("JOB_BOARD_STATUS_VOCABULARY") {
            Ok(raw) => StatusVocabulary::parse(&raw)
                .ok_or(ConfigError::InvalidStatusVocabulary(raw))?,
            Err(_) => StatusVocabulary::Canonical,
        };

        let locale = env::var("JOB_BOARD_LOCALE")
            .map(|raw| Locale::parse(&raw))
            .unwrap_or(Locale::En);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            status_vocabulary,
            locale,
        })
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            status_vocabulary: StatusVocabulary::Canonical,
            locale: Locale::En,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBackendUrl(String),
    InvalidTimeout,
    InvalidStatusVocabulary(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBackendUrl(value) => write!(
                f,
                "JOB_BOARD_API_URL must be an http(s) URL, got '{}'",
                value
            ),
            ConfigError::InvalidTimeout => {
                write!(f, "JOB_BOARD_API_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidStatusVocabulary(value) => write!(
                f,
                "JOB_BOARD_STATUS_VOCABULARY must be 'canonical' or 'legacy', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBackendUrl(_)
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidStatusVocabulary(_) => None,
        }
    }
}
