use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_PATH: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// API key for the hosted generation service. May be absent: the server
    /// then runs degraded and every review request returns the fallback text.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro-latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("reviews.db"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml`, falling back to defaults when
    /// the file is absent. `GEMINI_API_KEY` and `PORT` environment variables
    /// override the file.
    pub fn load() -> Result<Self> {
        let mut config = match std::fs::read_to_string(CONFIG_PATH) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", CONFIG_PATH))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", CONFIG_PATH));
            }
        };

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.generator.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .context("PORT environment variable must be a port number")?;
        }

        Ok(config)
    }
}
