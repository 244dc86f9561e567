// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load and validate a configuration file.
///
/// Unlike `Config::load_or_default`, a missing or malformed file is an error.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating {}", config_path.display());

    let config = Config::load(config_path)?;
    match config.validate() {
        Ok(()) => {
            log::info!("✓ Config OK");
            log::info!("    Listing: {}", config.listing.url);
            log::info!(
                "    Archive: {} (capacity {}, error rate {})",
                config.archive.dir.join(&config.archive.archive_type).display(),
                config.archive.max_conversations,
                config.archive.error_rate
            );
            if let Some(year) = config.traversal.year {
                log::info!("    Year filter: {}", year);
            }
            Ok(config)
        }
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            Err(e)
        }
    }
}
