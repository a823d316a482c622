//! Configuration loading for mail-trigger.
//!
//! Locates the first existing config file, reads it and parses it as TOML
//! or YAML depending on the file extension.

use std::path::{Path, PathBuf};

use config_core::Config;

mod format;
pub mod paths;

pub use format::*;

/// The env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "MAIL_TRIGGER_CONFIG";

/// Errors returned while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No configuration file found in any of the provided paths.
    #[error("no config file found in paths: {paths:?}")]
    NotFound {
        /// The paths that were tried.
        paths: Vec<PathBuf>,
    },

    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration contents.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,

        /// Underlying parser error.
        #[source]
        source: ParseError,
    },
}

/// A loaded config along with the path it came from.
#[derive(Debug)]
pub struct Loaded {
    /// The parsed config.
    pub config: Config,

    /// The file the config was read from.
    pub path: PathBuf,
}

/// Load the config from the first existing file in the list of paths.
pub async fn load<P>(paths: &[P]) -> Result<Loaded, LoadError>
where
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = Format::from_path(path)
            .parse(&contents)
            .map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        return Ok(Loaded {
            config,
            path: path.to_path_buf(),
        });
    }

    Err(LoadError::NotFound {
        paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
    })
}

/// Load the config from an explicit path, or from the default locations.
pub async fn with(explicit: Option<PathBuf>) -> Result<Loaded, LoadError> {
    let paths: Vec<PathBuf> = paths::resolve(explicit).collect();
    load(&paths).await
}

/// Load the config honoring the [`CONFIG_PATH_ENV`] override.
#[cfg(feature = "env")]
pub async fn with_default_env_var() -> Result<Loaded, WithDefaultEnvVarError> {
    let explicit = envfury::maybe(CONFIG_PATH_ENV).map_err(WithDefaultEnvVarError::Env)?;
    with(explicit).await.map_err(WithDefaultEnvVarError::Load)
}

/// Errors that can occur during env-driven configuration loading.
#[cfg(feature = "env")]
#[derive(Debug, thiserror::Error)]
pub enum WithDefaultEnvVarError {
    /// Env variable reading error.
    #[error("config path env var read: {0}")]
    Env(#[source] envfury::Error<envfury::ValueError<<PathBuf as std::str::FromStr>::Err>>),

    /// Loading error.
    #[error(transparent)]
    Load(#[from] LoadError),
}
