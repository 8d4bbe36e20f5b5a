//! Factory configuration
//!
//! Configuration is a JSON document deserialized into [`FactoryConfig`]; every
//! field has a default, so partial documents are accepted.

mod schema;

pub use schema::*;

use std::path::Path;
use tracing::{debug, info};

use crate::error::{FactoryError, Result};

impl FactoryConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FactoryError::Config(e.to_string()))
    }

    /// Serialize configuration as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load configuration from `path`, falling back to defaults if the file does not exist
pub async fn load_config(path: &Path) -> Result<FactoryConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let config = FactoryConfig::from_json_str(&json)?;
            info!("Loaded configuration from {}", path.display());
            debug!("Configuration: {:?}", config);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            Ok(FactoryConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write configuration to `path` as pretty JSON, creating parent directories
pub async fn save_config(path: &Path, config: &FactoryConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, config.to_json_string()?).await?;
    Ok(())
}
