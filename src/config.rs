use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Compile-time endpoint defaults. Debug builds point at a local record
/// server, release builds at production.
pub mod endpoints {
    #[cfg(debug_assertions)]
    pub const RECORDS: &str = "http://localhost:8000/v1";

    #[cfg(not(debug_assertions))]
    pub const RECORDS: &str = "https://records.got-emoji.app/v1";
}

/// Application container identifier sent with every remote request.
pub const CONTAINER_ID: &str = "got-emoji.entries";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub container_id: String,
    /// Label stamped onto entries created on this device.
    pub device_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: endpoints::RECORDS.to_string(),
            container_id: CONTAINER_ID.to_string(),
            device_label: "Desktop".to_string(),
        }
    }
}

impl Config {
    /// Load from a JSON file, falling back to defaults when the file does
    /// not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
