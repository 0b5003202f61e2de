//! First-run and migration setup.
//!
//! The translation endpoint is unauthenticated, so there is nothing to ask
//! the user: setup writes a default configuration when none exists and
//! restamps the version line after upgrades.

pub mod version;

use crate::config::{config_path, OvtConfig};
use anyhow::Result;

/// Ensures a current, version-stamped configuration file exists.
///
/// Called early in startup, before command handling.
///
/// # Errors
/// - If the config directory cannot be created
/// - If the config file cannot be written
pub fn ensure_config() -> Result<()> {
    let config_path = config_path()?;

    match version::check(&config_path)? {
        version::SetupAction::WriteDefaults => {
            let body = OvtConfig::default().to_toml()?;
            version::write_stamped(&config_path, &body)?;
            tracing::info!(
                "Default configuration written to {}",
                config_path.display()
            );
        }
        version::SetupAction::Restamp { from } => {
            version::restamp(&config_path)?;
            tracing::info!(
                "Configuration migrated from version {} to {}",
                from,
                env!("CARGO_PKG_VERSION")
            );
        }
        version::SetupAction::None => {
            tracing::debug!("Configuration up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
