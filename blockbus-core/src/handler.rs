//! Block-specific protocol hooks
//!
//! The base protocol is the same on every block. Everything that depends on
//! what the block actually is goes through this trait.

use blockbus_protocol::{FrameReader, PowerLevel};

use crate::response::ResponseBuffer;

/// Hooks implemented by a concrete block
pub trait BlockHandler {
    /// Handle a command addressed to the block's own target id
    ///
    /// `payload` is positioned after the command byte; `payload.remaining()`
    /// is the declared payload length. Results go into `response` and are
    /// sent on the next read. Bytes left unread are discarded afterwards.
    fn process_command(
        &mut self,
        command: u8,
        payload: &mut FrameReader<'_>,
        response: &mut ResponseBuffer,
    );

    /// Write the module version record into `response`
    fn fill_module_version(&mut self, response: &mut ResponseBuffer);

    /// Apply a power-save level to the block's own peripherals
    fn power_save(&mut self, level: PowerLevel);

    /// Current bus address of the extension in slot `extension`
    ///
    /// Only called on blocks with extension support.
    fn extension_address(&mut self, extension: usize) -> u8 {
        let _ = extension;
        0
    }

    /// Re-address the extension in slot `extension`
    ///
    /// Range checking is up to the block; only it knows what the extension
    /// hardware accepts.
    fn change_extension_address(&mut self, extension: usize, address: u8) {
        let _ = (extension, address);
    }
}
