use crate::error::{Result, SchemaError};
use crate::model::{DataType, ValueType, DEFAULT_DELIMITER};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "ruleschema.json";

/// What happens to an object's property sets and scripts when it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectDeletePolicy {
    /// Owned property sets and scripts stay live without an owner.
    #[default]
    Orphan,
    /// Owned property sets and scripts are deleted with the object.
    Cascade,
}

/// Engine configuration, stored in `ruleschema.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Splits incoming attribute value tokens into separate entries
    #[serde(default = "default_delimiter")]
    pub value_delimiter: char,

    #[serde(default)]
    pub default_value_type: ValueType,

    #[serde(default)]
    pub default_data_type: DataType,

    /// Used by `SchemaApi::delete_object` when no policy is given
    #[serde(default)]
    pub object_delete_policy: ObjectDeletePolicy,

    /// Report writes to locked attribute values as errors instead of warnings
    #[serde(default)]
    pub strict_value_lock: bool,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            value_delimiter: DEFAULT_DELIMITER,
            default_value_type: ValueType::default(),
            default_data_type: DataType::default(),
            object_delete_policy: ObjectDeletePolicy::default(),
            strict_value_lock: false,
        }
    }
}

impl EngineConfig {
    /// The per-user config directory, if the platform has one.
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "ruleschema", "ruleschema").map(|d| d.config_dir().to_path_buf())
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SchemaError::Io)?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(SchemaError::Serialization)?;
        Ok(config)
    }

    /// Load from [`EngineConfig::global_dir`], falling back to defaults.
    pub fn load_global() -> Result<Self> {
        match Self::global_dir() {
            Some(dir) => Self::load(dir),
            None => Ok(Self::default()),
        }
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(SchemaError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SchemaError::Serialization)?;
        fs::write(config_path, content).map_err(SchemaError::Io)?;
        Ok(())
    }
}
