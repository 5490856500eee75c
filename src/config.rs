use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PetitionsConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("petitions.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".petitions").join("petitions.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PetitionsConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PetitionsConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PetitionsConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the database path: explicit flag, then config file, then the default
/// under `base`.
pub fn resolve_database_path(
    explicit: Option<&Path>,
    config: Option<&PetitionsConfig>,
    base: &Path,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_database_path_in(base))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
