use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AccountSettings, AuthSettings, CatalogSettings, EngineSettings, MarketDataSettings,
    ServerSettings, Settings, TokenEntry,
};

/// Loads the application configuration from a TOML file.
///
/// Values can be overridden through environment variables with the `MERIDIAN_`
/// prefix, e.g. `MERIDIAN_SERVER__PORT=9000` overrides `[server] port`.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("MERIDIAN")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}
