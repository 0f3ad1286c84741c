use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::StoreOptions;

/// Contents of `healthlog.toml`. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HealthConfig {
    pub database: Option<String>,
    /// bcrypt cost for stored passwords
    pub password_cost: Option<u32>,
    #[serde(default)]
    pub seed: SeedDefaults,
}

/// Defaults for `healthlog seed`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SeedDefaults {
    pub users: Option<usize>,
    pub days: Option<u32>,
    pub seed: Option<u64>,
}

impl HealthConfig {
    /// Database path: `override_path`, then the config, then the default
    pub fn database_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    pub fn store_options(&self) -> StoreOptions {
        match self.password_cost {
            Some(password_cost) => StoreOptions { password_cost },
            None => StoreOptions::default(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("healthlog.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("health_database.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<HealthConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: HealthConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &HealthConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
