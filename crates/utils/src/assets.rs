use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "property-dashboard";
const APPLICATION: &str = "property-dashboard";

/// Directory holding the local database and any other persisted state.
///
/// Debug builds keep everything under `dev_assets/` in the working directory so
/// local runs never touch the user's real data directory.
pub fn asset_dir() -> std::io::Result<PathBuf> {
    let path = if cfg!(debug_assertions) {
        std::env::current_dir()?.join("dev_assets")
    } else {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not resolve a home directory for application data",
                )
            })?
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
        tracing::debug!(path = %path.display(), "created asset directory");
    }

    Ok(path)
}
