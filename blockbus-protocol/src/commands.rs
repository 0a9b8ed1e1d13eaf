//! Base protocol command set
//!
//! Commands addressed to [`BASE_TARGET_ID`] are shared by every block. The
//! command byte space of a block's own target id belongs to the block.

/// Target id of the base protocol
pub const BASE_TARGET_ID: u8 = 0xFA;

// Command ids of the base protocol
pub const CMD_GET_EXT_COUNT: u8 = 0xF1;
pub const CMD_ACTIVATE_EXTENSION: u8 = 0xF2;
pub const CMD_GET_EXT_ADDRESS: u8 = 0xF3;
pub const CMD_CHANGE_EXT_ADDRESS: u8 = 0xF4;
pub const CMD_GET_EXT_ADDR_COUNT: u8 = 0xF5;
pub const CMD_GET_EXT_ADDR_LIST: u8 = 0xF6;
pub const CMD_GET_MODULE_VERSION: u8 = 0xF7;
pub const CMD_SET_POWER_SAVE: u8 = 0xF8;
pub const CMD_CHANGE_BUS_ADDRESS: u8 = 0xFE;

/// Commands of the base protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaseCommand {
    /// Number of extension slots (1 byte response)
    GetExtensionCount,
    /// Select the active extension slot (1 byte index)
    ActivateExtension,
    /// Address of the active extension (1 byte response)
    GetExtensionAddress,
    /// Re-address the active extension (1 byte address)
    ChangeExtensionAddress,
    /// Number of candidate addresses of the active extension (1 byte response)
    GetExtensionAddressListLength,
    /// Candidate addresses of the active extension (N byte response)
    GetExtensionAddressList,
    /// Block type and hardware revision (block-defined response)
    GetModuleVersion,
    /// Power-save level (1 byte level)
    SetPowerLevel,
    /// Persist a new bus address and restart (0 or 1 byte address)
    ChangeBusAddress,
}

impl BaseCommand {
    /// Parse a command from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_GET_EXT_COUNT => Some(BaseCommand::GetExtensionCount),
            CMD_ACTIVATE_EXTENSION => Some(BaseCommand::ActivateExtension),
            CMD_GET_EXT_ADDRESS => Some(BaseCommand::GetExtensionAddress),
            CMD_CHANGE_EXT_ADDRESS => Some(BaseCommand::ChangeExtensionAddress),
            CMD_GET_EXT_ADDR_COUNT => Some(BaseCommand::GetExtensionAddressListLength),
            CMD_GET_EXT_ADDR_LIST => Some(BaseCommand::GetExtensionAddressList),
            CMD_GET_MODULE_VERSION => Some(BaseCommand::GetModuleVersion),
            CMD_SET_POWER_SAVE => Some(BaseCommand::SetPowerLevel),
            CMD_CHANGE_BUS_ADDRESS => Some(BaseCommand::ChangeBusAddress),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            BaseCommand::GetExtensionCount => CMD_GET_EXT_COUNT,
            BaseCommand::ActivateExtension => CMD_ACTIVATE_EXTENSION,
            BaseCommand::GetExtensionAddress => CMD_GET_EXT_ADDRESS,
            BaseCommand::ChangeExtensionAddress => CMD_CHANGE_EXT_ADDRESS,
            BaseCommand::GetExtensionAddressListLength => CMD_GET_EXT_ADDR_COUNT,
            BaseCommand::GetExtensionAddressList => CMD_GET_EXT_ADDR_LIST,
            BaseCommand::GetModuleVersion => CMD_GET_MODULE_VERSION,
            BaseCommand::SetPowerLevel => CMD_SET_POWER_SAVE,
            BaseCommand::ChangeBusAddress => CMD_CHANGE_BUS_ADDRESS,
        }
    }

    /// Returns true if the command only makes sense on blocks with extensions
    pub fn needs_extensions(&self) -> bool {
        matches!(
            self,
            BaseCommand::GetExtensionCount
                | BaseCommand::ActivateExtension
                | BaseCommand::GetExtensionAddress
                | BaseCommand::ChangeExtensionAddress
                | BaseCommand::GetExtensionAddressListLength
                | BaseCommand::GetExtensionAddressList
        )
    }
}

/// Power-save level requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerLevel {
    /// Full power
    #[default]
    None,
    /// Reduced activity, CPU stays responsive
    Light,
    /// CPU halted until the next bus interrupt, extension rail may be cut
    Deep,
}

// Wire format values
const POWER_SAVE_NONE: u8 = 0;
const POWER_SAVE_LIGHT: u8 = 1;
const POWER_SAVE_DEEP: u8 = 2;

impl PowerLevel {
    /// Parse a level from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            POWER_SAVE_NONE => Some(PowerLevel::None),
            POWER_SAVE_LIGHT => Some(PowerLevel::Light),
            POWER_SAVE_DEEP => Some(PowerLevel::Deep),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            PowerLevel::None => POWER_SAVE_NONE,
            PowerLevel::Light => POWER_SAVE_LIGHT,
            PowerLevel::Deep => POWER_SAVE_DEEP,
        }
    }
}
