//! `.quillrc.toml` discovery
//!
//! The config file is looked up in the working directory only. Every key is optional; unknown keys are rejected.
//!
//! ```toml
//! tab_width = 4
//! single_quote = true
//! semi = false
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::format::{FormatConfig, QuoteStyle};

pub const CONFIG_FILE_NAME: &str = ".quillrc.toml";

/// Options read from `.quillrc.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub tab_width: Option<usize>,
    pub single_quote: Option<bool>,
    pub semi: Option<bool>,
}

impl ConfigFile {
    /// Layer these options over `config`.
    pub fn apply(&self, mut config: FormatConfig) -> FormatConfig {
        if let Some(width) = self.tab_width {
            config = config.with_indent_width(width);
        }
        if let Some(single) = self.single_quote {
            config = config.with_quote_style(if single { QuoteStyle::Single } else { QuoteStyle::Double });
        }
        if let Some(semi) = self.semi {
            config = config.with_semicolons(semi);
        }
        config
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file .quillrc.toml: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration file .quillrc.toml: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}

/// Load `.quillrc.toml` from `dir`, if present.
pub fn load(dir: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read { source })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    parse(&text).map(Some)
}

pub fn parse(text: &str) -> Result<ConfigFile, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse { source })
}
