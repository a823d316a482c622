//! Opinionated default configuration file paths.

use std::path::PathBuf;

use either::Either;

/// Returns an iterator over default configuration file paths.
///
/// The paths are yielded in order of preference:
/// 1. User-specific config directory (XDG standard), TOML then YAML
/// 2. User-specific config in home directory (fallback)
/// 3. System-wide config
pub fn defaults() -> impl Iterator<Item = PathBuf> {
    let config_path = dirs::config_dir().into_iter().flat_map(|d| {
        [
            d.join("mail-trigger/config.toml"),
            d.join("mail-trigger/config.yaml"),
        ]
    });
    let home_path = dirs::home_dir().into_iter().flat_map(|d| {
        [
            d.join(".mail-trigger.toml"),
            d.join(".mail-trigger.yaml"),
        ]
    });
    let system_path = [
        PathBuf::from("/etc/mail-trigger/config.toml"),
        PathBuf::from("/etc/mail-trigger/config.yaml"),
    ];

    config_path.chain(home_path).chain(system_path)
}

/// Resolves configuration paths based on an explicit override or the defaults.
pub fn resolve(explicit: Option<PathBuf>) -> impl Iterator<Item = PathBuf> {
    match explicit {
        Some(val) => Either::Left(std::iter::once(val)),
        None => Either::Right(defaults()),
    }
}
