use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LeaguebookConfig {
    /// Database file, relative to the working directory
    pub database: Option<String>,
    /// Dataset imported by `leaguebook seed` when no file is given
    pub seed: Option<String>,
}

impl LeaguebookConfig {
    /// Database path, with an explicit override taking precedence
    pub fn database_path(&self, cli_override: Option<&Path>) -> PathBuf {
        match (cli_override, &self.database) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(configured)) => PathBuf::from(configured),
            (None, None) => default_database_path(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("leaguebook.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("leaguebook.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<LeaguebookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: LeaguebookConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &LeaguebookConfig, force: bool) -> anyhow::Result<()> {
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
