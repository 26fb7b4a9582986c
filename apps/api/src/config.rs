use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Construction fails at startup if required variables are missing —
/// the process must not start serving without a Gemini credential.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub response_format: ResponseFormat,
    pub port: u16,
    pub rust_log: String,
}

/// Which output shape the model is asked for and which interpreter
/// decodes the reply. Selected once at startup via LOAN_RESPONSE_FORMAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Raw,
    KeyValue,
    Json,
    Table,
}

impl ResponseFormat {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "raw" => Ok(ResponseFormat::Raw),
            "keyvalue" => Ok(ResponseFormat::KeyValue),
            "json" => Ok(ResponseFormat::Json),
            "table" => Ok(ResponseFormat::Table),
            other => bail!(
                "LOAN_RESPONSE_FORMAT must be one of raw|keyvalue|json|table, got '{other}'"
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            response_format: ResponseFormat::parse(
                &std::env::var("LOAN_RESPONSE_FORMAT").unwrap_or_else(|_| "json".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
