mod config;
pub mod store;

pub use config::{Config, OutboxConfig, RemindersConfig, SweepConfig};
pub use store::Store;

use std::path::PathBuf;

/// Returns the data directory, honoring two environment overrides.
///
/// `COOLOFF_DATA_DIR` points at an explicit directory (tests, portable
/// installs); otherwise `~/.config/cooloff[-dev]` based on `COOLOFF_ENV`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var("COOLOFF_DATA_DIR") {
        Ok(explicit) => PathBuf::from(explicit),
        Err(_) => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("COOLOFF_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cooloff-dev")
            } else {
                base_dir.join("cooloff")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
