//! Config file formats.

use std::path::Path;

use config_core::Config;

/// Supported config file formats.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Format {
    /// TOML, the default.
    Toml,

    /// YAML, picked for `.yaml` and `.yml` files.
    Yaml,
}

/// Errors returned while parsing config contents.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Invalid TOML.
    #[error("toml: {0}")]
    Toml(#[source] toml::de::Error),

    /// Invalid YAML.
    #[error("yaml: {0}")]
    Yaml(#[source] serde_yaml_bw::Error),
}

impl Format {
    /// Pick the format by the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Toml,
        }
    }

    /// Parse the config contents.
    pub fn parse(self, contents: &str) -> Result<Config, ParseError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(ParseError::Toml),
            Self::Yaml => serde_yaml_bw::from_str(contents).map_err(ParseError::Yaml),
        }
    }
}
