//! Frame parsing and encoding
//!
//! Frame format (one I2C write transaction):
//! - TARGET ID (1 byte): [`BASE_TARGET_ID`] or the block type id
//! - COMMAND (1 byte): command identifier within the target's protocol
//! - PAYLOAD (0-30 bytes): command-specific data
//!
//! There is no length byte or checksum; the transaction boundary delimits
//! the frame.

use heapless::Vec;

use crate::commands::{BaseCommand, BASE_TARGET_ID};

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 30;

/// Maximum complete frame size (TARGET + COMMAND + MAX_PAYLOAD)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + MAX_PAYLOAD_SIZE;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer than two bytes received
    TooShort,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Who a frame is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Base protocol, understood by every block
    Base,
    /// Device-specific protocol of the given block type
    Block(u8),
}

impl Target {
    /// Classify a target id byte
    pub fn from_byte(byte: u8) -> Self {
        if byte == BASE_TARGET_ID {
            Target::Base
        } else {
            Target::Block(byte)
        }
    }

    /// Wire byte of this target
    pub fn to_byte(self) -> u8 {
        match self {
            Target::Base => BASE_TARGET_ID,
            Target::Block(id) => id,
        }
    }
}

/// A received frame, borrowed from the transaction buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Addressed protocol
    pub target: Target,
    /// Command byte
    pub command: u8,
    /// Remaining bytes of the transaction
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Split a write transaction into header and payload
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FrameError> {
        match bytes {
            [target, command, payload @ ..] => Ok(Self {
                target: Target::from_byte(*target),
                command: *command,
                payload,
            }),
            _ => Err(FrameError::TooShort),
        }
    }
}

/// Read cursor over one write transaction
///
/// Mirrors the receive FIFO of the bus peripheral: every byte of a
/// transaction has to be consumed before the next one is interpreted.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    /// Create a reader positioned at the first byte
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Total number of bytes in the transaction
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the transaction carried no bytes at all
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Read the next byte
    pub fn read(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    /// Unconsumed bytes, without consuming them
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// Discard all remaining bytes
    ///
    /// Returns the number of bytes discarded.
    pub fn drain(&mut self) -> usize {
        let drained = self.remaining();
        self.pos = self.bytes.len();
        drained
    }
}

/// A frame to be sent by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Addressed protocol
    pub target: Target,
    /// Command byte
    pub command: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Request {
    /// Create a new request with the given target, command and payload
    pub fn new(target: Target, command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            target,
            command,
            payload: payload_vec,
        })
    }

    /// Base protocol request
    pub fn base(command: BaseCommand, payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(Target::Base, command.to_byte(), payload)
    }

    /// Encode this request into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = 2 + self.payload.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.target.to_byte();
        buffer[1] = self.command;
        buffer[2..frame_len].copy_from_slice(&self.payload);

        Ok(frame_len)
    }

    /// Encode this request into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}
