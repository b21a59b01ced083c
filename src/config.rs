use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VpayConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default = "default_vendors")]
    pub vendors: Vec<VendorEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub db_path: String,
}

/// First-run population
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeedConfig {
    pub student_prefix: String,
    pub student_count: u32,
    /// Zero-padded width of the student sequence number
    pub id_width: usize,
    pub admin_username: String,
    pub admin_password: String,
    pub vendor_username: String,
    pub vendor_password: String,
}

/// Nearby vendor shown to students when paying
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VendorEntry {
    pub name: String,
    pub distance: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_vendors() -> Vec<VendorEntry> {
    [
        ("Campus Cafeteria", "50m"),
        ("Bookstore", "120m"),
        ("Coffee Shop", "200m"),
    ]
    .into_iter()
    .map(|(name, distance)| VendorEntry {
        name: name.to_string(),
        distance: distance.to_string(),
    })
    .collect()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "./data/vpay".to_string(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            student_prefix: "24101C".to_string(),
            student_count: 80,
            id_width: 4,
            admin_username: "4455".to_string(),
            admin_password: "4455".to_string(),
            vendor_username: "5544".to_string(),
            vendor_password: "5544".to_string(),
        }
    }
}

impl SeedConfig {
    /// Username of the n-th seeded student, e.g. `24101C0007`.
    pub fn student_id(&self, n: u32) -> String {
        format!("{}{:0width$}", self.student_prefix, n, width = self.id_width)
    }
}

impl Default for VpayConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            seed: SeedConfig::default(),
            vendors: default_vendors(),
        }
    }
}

impl VpayConfig {
    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist. A file that exists but cannot be read or parsed
    /// is an error, never a silent fallback to another database path.
    pub fn load_or_create(path: &str) -> Result<Self, ConfigError> {
        let file = Path::new(path);
        if !file.exists() {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            let text = toml::to_string_pretty(&config)?;
            if let Err(e) = std::fs::write(file, text) {
                warn!("Could not write default config to {}: {}", path, e);
            }
            return Ok(config);
        }

        let text = std::fs::read_to_string(file).map_err(|e| ConfigError::Read(path.to_string(), e))?;
        let config = toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_string(), e))?;
        info!("Config loaded from {}", path);
        Ok(config)
    }
}
