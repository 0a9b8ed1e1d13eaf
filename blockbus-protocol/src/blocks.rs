//! Block type catalogue and module version record
//!
//! Block type ids double as default bus addresses, so they are all chosen
//! inside the unreserved 7-bit address range.

/// Known block classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockType {
    Power,
    Rgb,
    MotorDriver,
    Display,
    Sound,
    Button,
    Position,
    Ambient,
}

const TYPE_POWER: u8 = 0x08;
const TYPE_RGB: u8 = 0x09;
const TYPE_MOTOR_DRIVER: u8 = 0x0A;
const TYPE_DISPLAY: u8 = 0x0B;
const TYPE_SOUND: u8 = 0x0C;
const TYPE_BUTTON: u8 = 0x0D;
const TYPE_POSITION: u8 = 0x0E;
const TYPE_AMBIENT: u8 = 0x0F;

impl BlockType {
    /// Look up a block class by its type id
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            TYPE_POWER => Some(BlockType::Power),
            TYPE_RGB => Some(BlockType::Rgb),
            TYPE_MOTOR_DRIVER => Some(BlockType::MotorDriver),
            TYPE_DISPLAY => Some(BlockType::Display),
            TYPE_SOUND => Some(BlockType::Sound),
            TYPE_BUTTON => Some(BlockType::Button),
            TYPE_POSITION => Some(BlockType::Position),
            TYPE_AMBIENT => Some(BlockType::Ambient),
            _ => None,
        }
    }

    /// Type id, also the default bus address
    pub fn id(self) -> u8 {
        match self {
            BlockType::Power => TYPE_POWER,
            BlockType::Rgb => TYPE_RGB,
            BlockType::MotorDriver => TYPE_MOTOR_DRIVER,
            BlockType::Display => TYPE_DISPLAY,
            BlockType::Sound => TYPE_SOUND,
            BlockType::Button => TYPE_BUTTON,
            BlockType::Position => TYPE_POSITION,
            BlockType::Ambient => TYPE_AMBIENT,
        }
    }

    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Power => "power_block",
            BlockType::Rgb => "rgb_block",
            BlockType::MotorDriver => "motor_block",
            BlockType::Display => "disp_block",
            BlockType::Sound => "sound_block",
            BlockType::Button => "button_block",
            BlockType::Position => "position_block",
            BlockType::Ambient => "ambient_block",
        }
    }
}

/// Response of the module version command
///
/// Wire layout: `[block_type_id][pcb_version][adjustment_version]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleVersion {
    /// Block type id of the responding block
    pub block_type_id: u8,
    /// Major (PCB) revision
    pub pcb: u8,
    /// Minor (assembly adjustment) revision
    pub adjustment: u8,
}

impl ModuleVersion {
    /// Encoded size in bytes
    pub const SIZE: usize = 3;

    /// Wire representation
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        [self.block_type_id, self.pcb, self.adjustment]
    }

    /// Parse from a response; `None` if fewer than three bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [block_type_id, pcb, adjustment, ..] => Some(Self {
                block_type_id: *block_type_id,
                pcb: *pcb,
                adjustment: *adjustment,
            }),
            _ => None,
        }
    }
}
