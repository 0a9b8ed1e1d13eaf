//! Block description compiled in from block.toml
//!
//! build.rs validates block.toml and emits the constants included here.

use blockbus_core::{BlockConfig, Capabilities, ConfigError, ExtensionSupport};

include!(concat!(env!("OUT_DIR"), "/block.rs"));

/// Build the controller configuration
pub fn block_config() -> Result<BlockConfig, ConfigError> {
    let mut config = BlockConfig::new(BLOCK_TYPE_ID)
        .with_version(PCB_VERSION, ADJUSTMENT_VERSION)
        .with_capabilities(Capabilities {
            extensions: EXTENSION_SUPPORT,
            has_power_rail: HAS_POWER_RAIL,
            auto_deep_sleep: AUTO_DEEP_SLEEP,
        });

    for addresses in EXTENSIONS {
        config = config.with_extension(addresses)?;
    }

    config.validate()?;
    Ok(config)
}
