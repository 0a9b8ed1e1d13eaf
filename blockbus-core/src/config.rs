//! Block configuration
//!
//! Describes which block class a device is and which parts of the base
//! protocol it supports. Everything that used to be chosen by compile-time
//! switches is a value here and is checked at dispatch time.

use heapless::Vec;

use blockbus_protocol::{ModuleVersion, BASE_TARGET_ID};

use crate::extension::{
    ExtensionRegistry, RegistryError, MAX_EXTENSIONS, MAX_EXTENSION_ADDRESSES,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How many extension slots a block exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtensionSupport {
    /// Extension commands are unsupported
    #[default]
    None,
    /// Exactly one slot; it cannot be switched
    Single,
    /// Several slots selectable by the host
    Multiple,
}

/// Optional protocol features of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Capabilities {
    /// Extension command support
    pub extensions: ExtensionSupport,
    /// Block has a switchable supply rail for its extensions
    pub has_power_rail: bool,
    /// CPU sleeps after entering deep power save
    pub auto_deep_sleep: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            extensions: ExtensionSupport::None,
            has_power_rail: true,
            auto_deep_sleep: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Block type id is outside the 7-bit address range or collides with the base id
    InvalidBlockTypeId(u8),
    /// Address lists given but extension support is off
    UnexpectedExtensions,
    /// Extension support is on but no address list was given
    MissingExtensions,
    /// Single-extension block with more than one list
    TooManyForSingle,
    /// An address list is empty
    EmptyAddressList(u8),
    /// Address list table rejected by the registry
    Registry(RegistryError),
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        ConfigError::Registry(e)
    }
}

/// Static description of a block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockConfig {
    /// Block type id, also the default bus address
    pub block_type_id: u8,
    /// Major (PCB) revision
    pub pcb_version: u8,
    /// Minor (assembly adjustment) revision
    pub adjustment_version: u8,
    /// Optional protocol features
    pub capabilities: Capabilities,
    /// Candidate addresses for each extension slot
    pub extensions: Vec<Vec<u8, MAX_EXTENSION_ADDRESSES>, MAX_EXTENSIONS>,
}

impl BlockConfig {
    /// Configuration of a block without extensions
    pub fn new(block_type_id: u8) -> Self {
        Self {
            block_type_id,
            pcb_version: 0,
            adjustment_version: 0,
            capabilities: Capabilities::default(),
            extensions: Vec::new(),
        }
    }

    /// Set the hardware revision
    pub fn with_version(mut self, pcb: u8, adjustment: u8) -> Self {
        self.pcb_version = pcb;
        self.adjustment_version = adjustment;
        self
    }

    /// Set the capability flags
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Add an extension slot with its candidate addresses
    pub fn with_extension(mut self, addresses: &[u8]) -> Result<Self, ConfigError> {
        let mut list = Vec::new();
        list.extend_from_slice(addresses)
            .map_err(|_| RegistryError::TooManyAddresses)?;
        self.extensions
            .push(list)
            .map_err(|_| RegistryError::TooManyExtensions)?;
        Ok(self)
    }

    /// Version record reported by the module version command
    pub fn module_version(&self) -> ModuleVersion {
        ModuleVersion {
            block_type_id: self.block_type_id,
            pcb: self.pcb_version,
            adjustment: self.adjustment_version,
        }
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_type_id > 0x7F || self.block_type_id == BASE_TARGET_ID {
            return Err(ConfigError::InvalidBlockTypeId(self.block_type_id));
        }

        match (self.capabilities.extensions, self.extensions.len()) {
            (ExtensionSupport::None, 0) => {}
            (ExtensionSupport::None, _) => return Err(ConfigError::UnexpectedExtensions),
            (_, 0) => return Err(ConfigError::MissingExtensions),
            (ExtensionSupport::Single, n) if n > 1 => return Err(ConfigError::TooManyForSingle),
            _ => {}
        }

        for (index, list) in self.extensions.iter().enumerate() {
            // A leading terminator would make the list empty on the wire
            if list.first().map_or(true, |&a| a == 0) {
                return Err(ConfigError::EmptyAddressList(index as u8));
            }
        }

        Ok(())
    }

    /// Build the extension registry described by this configuration
    pub fn registry(&self) -> Result<ExtensionRegistry, ConfigError> {
        Ok(ExtensionRegistry::new(&self.extensions[..])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_block_is_valid() {
        let config = BlockConfig::new(0x0D).with_version(1, 2);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.module_version().to_bytes(), [0x0D, 1, 2]);
        assert_eq!(config.registry().unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_block_type_id() {
        assert_eq!(
            BlockConfig::new(0x80).validate(),
            Err(ConfigError::InvalidBlockTypeId(0x80))
        );
        assert_eq!(
            BlockConfig::new(BASE_TARGET_ID).validate(),
            Err(ConfigError::InvalidBlockTypeId(BASE_TARGET_ID))
        );
    }

    #[test]
    fn test_extensions_need_support() {
        let config = BlockConfig::new(0x0F).with_extension(&[0x76, 0x77]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::UnexpectedExtensions));

        let config = BlockConfig::new(0x0F).with_capabilities(Capabilities {
            extensions: ExtensionSupport::Multiple,
            ..Capabilities::default()
        });
        assert_eq!(config.validate(), Err(ConfigError::MissingExtensions));
    }

    #[test]
    fn test_single_extension_limit() {
        let config = BlockConfig::new(0x0F)
            .with_capabilities(Capabilities {
                extensions: ExtensionSupport::Single,
                ..Capabilities::default()
            })
            .with_extension(&[0x76])
            .unwrap()
            .with_extension(&[0x40])
            .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::TooManyForSingle));
    }

    #[test]
    fn test_empty_address_list() {
        let config = BlockConfig::new(0x0F)
            .with_capabilities(Capabilities {
                extensions: ExtensionSupport::Multiple,
                ..Capabilities::default()
            })
            .with_extension(&[0x76])
            .unwrap()
            .with_extension(&[])
            .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::EmptyAddressList(1)));
    }

    #[test]
    fn test_registry_from_config() {
        let config = BlockConfig::new(0x0F)
            .with_capabilities(Capabilities {
                extensions: ExtensionSupport::Multiple,
                ..Capabilities::default()
            })
            .with_extension(&[0x76, 0x77])
            .unwrap()
            .with_extension(&[0x40])
            .unwrap();

        let registry = config.registry().unwrap();
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.list(1), Some(&[0x40][..]));
    }
}
