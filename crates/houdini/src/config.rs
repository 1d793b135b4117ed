use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::command::{CommandTable, DEFAULT_NAMESPACE};
use crate::error::{HoudiniError, Result};

pub const CONFIG_FILE_NAME: &str = "houdini.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoudiniConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_true")]
    pub secure_html: bool,
    #[serde(default = "default_true")]
    pub newline: bool,
}

pub fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for HoudiniConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            secure_html: true,
            newline: true,
        }
    }
}

impl HoudiniConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HoudiniError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: HoudiniConfig =
            toml::from_str(&content).map_err(|error| HoudiniError::TomlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    pub fn command_table(&self) -> CommandTable {
        CommandTable::new(self.namespace.clone())
    }
}
