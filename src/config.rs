use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub parser: ParserSettings,
}

/// Settings for the expense web service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

/// Settings for the caching gate proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_gate_port")]
    pub port: u16,
    /// Origin the gate fronts
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Cache partition name. Changing it is the only invalidation lever.
    #[serde(default = "default_partition")]
    pub partition: String,
    /// Paths fetched and stored at install time
    #[serde(default = "default_preload")]
    pub preload: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseSettings {
    /// SQLite file path; default lives under the user config dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParserSettings {
    /// Year assumed for SMS timestamps that carry none
    #[serde(default)]
    pub default_year: Option<i32>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_gate_port() -> u16 {
    8001
}

fn default_origin() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_partition() -> String {
    crate::gate::DEFAULT_PARTITION.to_string()
}

fn default_preload() -> Vec<String> {
    crate::gate::DEFAULT_PRELOAD
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gate_port(),
            origin: default_origin(),
            partition: default_partition(),
            preload: default_preload(),
        }
    }
}

impl Config {
    /// Load from the default config path; missing file means defaults
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load from an explicit path; missing file means defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Save to the default config path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("expense-tracker").join("config.toml"))
    }
}
