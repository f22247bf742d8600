use std::env;
use std::fmt;
use std::time::Duration;

use crate::workflows::screening::extraction::ExtractionLimits;
use crate::workflows::screening::token::TokenIssuer;

const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_EXTRACTION_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_TOKEN_MAX_ATTEMPTS: u32 = 16;

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

/// Top-level configuration for the screener.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub extraction: ExtractionConfig,
    pub tokens: TokenConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_document_bytes = positive_var(
            "SCREENING_MAX_DOCUMENT_BYTES",
            DEFAULT_MAX_DOCUMENT_BYTES as u64,
        )? as usize;
        let timeout_ms = positive_var(
            "SCREENING_EXTRACTION_TIMEOUT_MS",
            DEFAULT_EXTRACTION_TIMEOUT_MS,
        )?;
        let max_attempts = positive_var(
            "SCREENING_TOKEN_MAX_ATTEMPTS",
            u64::from(DEFAULT_TOKEN_MAX_ATTEMPTS),
        )?;
        let max_attempts = u32::try_from(max_attempts).map_err(|_| ConfigError::InvalidNumber {
            key: "SCREENING_TOKEN_MAX_ATTEMPTS",
            value: max_attempts.to_string(),
        })?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            extraction: ExtractionConfig {
                max_document_bytes,
                timeout: Duration::from_millis(timeout_ms),
            },
            tokens: TokenConfig { max_attempts },
        })
    }
}

fn positive_var(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw })?,
        Err(_) => default,
    };

    if value == 0 {
        return Err(ConfigError::MustBePositive { key });
    }
    Ok(value)
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Bounds applied at the document ingestion boundary.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionConfig {
    pub max_document_bytes: usize,
    pub timeout: Duration,
}

impl ExtractionConfig {
    pub fn limits(&self) -> ExtractionLimits {
        ExtractionLimits {
            max_bytes: self.max_document_bytes,
            timeout: self.timeout,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            timeout: Duration::from_millis(DEFAULT_EXTRACTION_TIMEOUT_MS),
        }
    }
}

/// Retry budget for status token issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfig {
    pub max_attempts: u32,
}

impl TokenConfig {
    pub fn issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.max_attempts)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_TOKEN_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    MustBePositive { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
            ConfigError::MustBePositive { key } => write!(f, "{key} must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
