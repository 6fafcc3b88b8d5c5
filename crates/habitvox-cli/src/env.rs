//! `.env` loading.

use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Load `.env` from the working directory or its parents, if there is one.
pub fn load_default_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load an explicitly named env file. Variables already set win.
pub fn load_env_file(path: &Path) -> Result<(), CliError> {
    dotenvy::from_path(path).map_err(|e| {
        CliError::Config(format!("could not load env file {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "Loaded env file");
    Ok(())
}
