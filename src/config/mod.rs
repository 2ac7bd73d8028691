//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Runtime configuration for the server.
///
/// Loaded from an optional YAML file, with environment variables taking
/// precedence for the values that change between deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// MongoDB connection string
    pub mongodb_uri: String,

    /// Database name
    pub database: String,

    /// HS256 secret for bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "water-delivery".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            token_ttl_hours: 24,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string. Missing keys take defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("failed to parse config")?;
        Ok(config)
    }

    /// Resolve the effective configuration: the file named by
    /// `AQUAROTA_CONFIG` (when set), then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("AQUAROTA_CONFIG") {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply the environment overrides used in deployment.
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            self.listen_addr = format!("0.0.0.0:{}", port);
        }
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            self.mongodb_uri = uri;
        }
        if let Ok(database) = std::env::var("MONGODB_DATABASE") {
            self.database = database;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
    }
}
