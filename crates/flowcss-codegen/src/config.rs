use flowcss_parser::CompileOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE: &str = "flowcss.toml";

/// Conversion settings, usually read from `flowcss.toml`. Every field is
/// optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Rewrite `opacity: 0` and `visibility: hidden` to visible values.
    pub force_visible: bool,
    /// Cap on explicit grid tracks produced from `repeat()`.
    pub max_grid_columns: usize,
    /// Pixel size of `1rem`/`1em`.
    pub root_font_size: f64,
    /// Maximum nesting of `var()` references.
    pub max_variable_depth: usize,
    /// Run the safety gate before handing out a payload.
    pub validate: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            force_visible: true,
            max_grid_columns: 12,
            root_font_size: 16.0,
            max_variable_depth: 10,
            validate: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConvertConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            root_font_size: self.root_font_size,
            max_variable_depth: self.max_variable_depth,
        }
    }
}
