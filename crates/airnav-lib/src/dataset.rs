use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename for the navigation dataset.
pub const DATASET_FILENAME: &str = "navdata.db";

/// Environment variable overriding the dataset location.
pub const DATA_DIR_ENV: &str = "AIRNAV_DATA_DIR";

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "airnav", "airnav").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATASET_FILENAME))
}

/// Locate the navigation dataset.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `AIRNAV_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
///
/// A directory resolves to the `navdata.db` inside it. The resolved file must
/// exist.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    let resolved = match target {
        Some(explicit) => canonical_dataset_path(explicit),
        None => match env::var_os(DATA_DIR_ENV) {
            Some(env_path) => canonical_dataset_path(Path::new(&env_path)),
            None => default_dataset_path()?,
        },
    };

    debug!(path = %resolved.display(), "resolved navigation dataset path");
    if !resolved.is_file() {
        return Err(Error::DatasetNotFound { path: resolved });
    }
    Ok(resolved)
}

fn canonical_dataset_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }

    path.join(DATASET_FILENAME)
}
