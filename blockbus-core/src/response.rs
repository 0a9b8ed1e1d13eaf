//! Response buffer
//!
//! The bus slave cannot answer inside a write transaction. Whatever a
//! command produces is parked here until the host issues the read phase,
//! which takes the whole buffer and leaves it empty.

use heapless::Vec;

use blockbus_protocol::MAX_PAYLOAD_SIZE;

/// Maximum number of response bytes
pub const RESPONSE_CAPACITY: usize = MAX_PAYLOAD_SIZE;

/// Errors from response buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseError {
    /// Response would exceed [`RESPONSE_CAPACITY`]
    Overflow,
}

/// Bytes produced by the last command, waiting for the read phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBuffer {
    data: Vec<u8, RESPONSE_CAPACITY>,
}

impl ResponseBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Discard any pending response
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of pending bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pending bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append one byte
    pub fn push(&mut self, byte: u8) -> Result<(), ResponseError> {
        self.data.push(byte).map_err(|_| ResponseError::Overflow)
    }

    /// Append several bytes
    ///
    /// On overflow nothing is appended.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), ResponseError> {
        self.data
            .extend_from_slice(bytes)
            .map_err(|_| ResponseError::Overflow)
    }

    /// Take the pending response, leaving the buffer empty
    pub fn take(&mut self) -> Vec<u8, RESPONSE_CAPACITY> {
        core::mem::take(&mut self.data)
    }
}
