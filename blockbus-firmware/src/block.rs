//! Button block: device-specific command set
//!
//! Commands addressed to the button block's own target id:
//!
//! | Command | Payload | Response |
//! |---------|---------|----------|
//! | `0x01` is pressed | - | 1 byte, 1 while held |
//! | `0x02` press count | - | u16 little-endian |
//! | `0x03` reset count | - | - |

use defmt::*;
use portable_atomic::Ordering;

use blockbus_core::{BlockHandler, ResponseBuffer};
use blockbus_protocol::{FrameReader, ModuleVersion, PowerLevel};

use crate::channels::{self, PRESS_COUNT, POWER_LEVEL};

pub const CMD_IS_PRESSED: u8 = 0x01;
pub const CMD_PRESS_COUNT: u8 = 0x02;
pub const CMD_RESET_COUNT: u8 = 0x03;

pub struct ButtonBlock {
    version: ModuleVersion,
}

impl ButtonBlock {
    pub fn new(version: ModuleVersion) -> Self {
        Self { version }
    }
}

impl BlockHandler for ButtonBlock {
    fn process_command(
        &mut self,
        command: u8,
        _payload: &mut FrameReader<'_>,
        response: &mut ResponseBuffer,
    ) {
        let result = match command {
            CMD_IS_PRESSED => response.push(channels::is_pressed() as u8),
            CMD_PRESS_COUNT => response.extend_from_slice(&channels::press_count().to_le_bytes()),
            CMD_RESET_COUNT => {
                PRESS_COUNT.store(0, Ordering::Relaxed);
                Ok(())
            }
            other => {
                debug!("Unknown button command {=u8:#x}", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Response dropped: {}", e);
        }
    }

    fn fill_module_version(&mut self, response: &mut ResponseBuffer) {
        if response.extend_from_slice(&self.version.to_bytes()).is_err() {
            warn!("Module version does not fit the response");
        }
    }

    fn power_save(&mut self, level: PowerLevel) {
        POWER_LEVEL.signal(level);
    }
}
