// Configuration Loader
// Layered configuration loading system

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::types::BenchConfig;

/// File name looked up in the global and project directories
pub const CONFIG_FILE_NAME: &str = "pokerbench.toml";

/// Configuration loader with layered support
pub struct ConfigLoader {
    /// Global config directory (`~/.pokerbench`)
    global_dir: Option<PathBuf>,
    /// Project config directory
    project_dir: Option<PathBuf>,
    /// File passed explicitly on the command line
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_dir: dirs::home_dir().map(|home| home.join(".pokerbench")),
            project_dir: None,
            config_file: None,
        }
    }

    /// Override the global directory. `None` disables the global layer.
    pub fn with_global_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Set project directory
    pub fn with_project_dir(mut self, dir: PathBuf) -> Self {
        self.project_dir = Some(dir);
        self
    }

    /// Set an explicit config file. Unlike the other layers it must exist.
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Load configuration with CLI overrides
    pub fn load_with_cli_overrides(
        &self,
        cli_overrides: Vec<(String, String)>,
    ) -> Result<BenchConfig> {
        // Load layers in order:
        // 1. Built-in defaults
        // 2. Global config (~/.pokerbench/pokerbench.toml)
        // 3. Project config (./pokerbench.toml)
        // 4. Explicit --config file
        // 5. CLI overrides

        let mut merged = toml::Value::try_from(BenchConfig::default())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
            .and_then(|value| match value {
                toml::Value::Table(table) => Ok(table),
                _ => Err(ConfigError::Invalid("defaults are not a table".to_string())),
            })?;

        if let Some(global_dir) = &self.global_dir {
            let path = global_dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                merge_tables(&mut merged, read_table(&path)?);
            }
        }

        if let Some(project_dir) = &self.project_dir {
            let path = project_dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                merge_tables(&mut merged, read_table(&path)?);
            }
        }

        if let Some(path) = &self.config_file {
            merge_tables(&mut merged, read_table(path)?);
        }

        for (key, value) in cli_overrides {
            apply_override(&mut merged, &key, &value)?;
        }

        let config: BenchConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a raw `KEY=VALUE` override.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidOverride(raw.to_string())),
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    debug!(path = %path.display(), "loading config layer");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn apply_override(root: &mut toml::Table, key: &str, raw: &str) -> Result<()> {
    let mut segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidOverride(format!("{key}={raw}")));
    }
    let Some(last) = segments.pop() else {
        return Err(ConfigError::InvalidOverride(format!("{key}={raw}")));
    };

    let mut table = root;
    for segment in segments {
        if !table.contains_key(segment) {
            table.insert(segment.to_string(), toml::Value::Table(toml::Table::new()));
        }
        table = match table.get_mut(segment) {
            Some(toml::Value::Table(next)) => next,
            _ => {
                return Err(ConfigError::OverrideConflict {
                    key: key.to_string(),
                    reason: format!("`{segment}` is not a table"),
                });
            }
        };
    }

    table.insert(last.to_string(), parse_override_value(raw));
    Ok(())
}

/// Interpret an override value as a TOML literal, falling back to a bare
/// string so `run.strategy=checkcall` works without quoting.
fn parse_override_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}
