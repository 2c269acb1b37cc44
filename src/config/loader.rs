use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Names a config file when `--config` is absent.
const CONFIG_ENV: &str = "STRATBENCH_CONFIG";

/// Config filenames checked in the working directory, in priority order.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["stratbench.toml", "stratbench.json"];

/// Loads the config named by `--config`, then `STRATBENCH_CONFIG`, then the
/// first default file in the working directory.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    let located = locate_config(
        path.map(PathBuf::from),
        std::env::var_os(CONFIG_ENV),
        Path::new("."),
    );
    match located {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            Ok(Some(load_config_file(&path)?))
        }
        None => Ok(None),
    }
}

/// Picks the config file to load without touching its contents.
///
/// An explicit path wins over the environment, which wins over discovery in
/// `dir`. An empty environment value counts as unset.
pub(crate) fn locate_config(
    explicit: Option<PathBuf>,
    from_env: Option<OsString>,
    dir: &Path,
) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if let Some(value) = from_env.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(value));
    }

    let mut found = DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file());
    let chosen = found.next()?;
    for ignored in found {
        warn!(
            "Ignoring {} because {} takes precedence",
            ignored.display(),
            chosen.display()
        );
    }
    Some(chosen)
}

pub(crate) fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}
