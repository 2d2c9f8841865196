use std::env;
use std::time::Duration;

use anyhow::{bail, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 20;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

// Everything the process reads from the environment, resolved once at
// startup. Handlers only ever see this struct (or pieces of it), never
// std::env.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gemini: GeminiConfig,
    pub cors: CorsConfig,
    // Declared data-store backend, if any. This build ships no connector;
    // the flag only drives what /test reports.
    pub data_store_backend: Option<String>,
    pub database_env: DatabaseEnv,
}

// No Debug derive: the API key must not leak through debug formatting.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

// Explicit CORS surface handed to the HTTP server constructor. A literal
// "*" entry means "any".
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    pub fn allows_any_method(&self) -> bool {
        self.allowed_methods.iter().any(|m| m == "*")
    }

    pub fn allows_any_header(&self) -> bool {
        self.allowed_headers.iter().any(|h| h == "*")
    }
}

// Presence of the data-store addressing variables, captured once for the
// /test diagnostics. Display only; never used to open a connection.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseEnv {
    pub url_set: bool,
    pub name_set: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = match env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("GEMINI_API_KEY is not set; refusing to start without provider credentials"),
        };

        let gemini = GeminiConfig {
            api_key,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            timeout: Duration::from_secs(
                parsed_env("GEMINI_TIMEOUT_SECS").unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS),
            ),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parsed_env("PORT").unwrap_or(DEFAULT_PORT),
            gemini,
            cors: CorsConfig {
                allowed_origins: list_env("CORS_ALLOWED_ORIGINS"),
                allowed_methods: list_env("CORS_ALLOWED_METHODS"),
                allowed_headers: list_env("CORS_ALLOWED_HEADERS"),
            },
            data_store_backend: env::var("DATA_STORE_BACKEND")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            database_env: DatabaseEnv {
                url_set: env_is_set("DATABASE_URL"),
                name_set: env_is_set("DATABASE_NAME"),
            },
        })
    }
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

// Comma-separated list, defaulting to the permissive "*".
fn list_env(name: &str) -> Vec<String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => vec!["*".to_string()],
    }
}

fn env_is_set(name: &str) -> bool {
    env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}
