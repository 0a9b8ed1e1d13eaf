//! Persistent address storage
//!
//! The bus address lives in one reserved slot of non-volatile storage. The
//! slot holds [`ADDRESS_UNSET`] until an address change is requested, in
//! which case the block falls back to its block type id.

/// Value stored in the address slot when no address was ever written
pub const ADDRESS_UNSET: u8 = 0xFF;

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Bus address assigned by the host
    BusAddress = 0,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::BusAddress),
            _ => None,
        }
    }
}

/// Errors from address storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying flash/EEPROM operation failed
    Flash,
    /// Storage bookkeeping failed (corrupt or full)
    Storage,
    /// Stored value has an unexpected shape
    Corrupted,
}

/// Byte-level store for the bus address
pub trait AddressStore {
    /// Read the stored address
    ///
    /// Returns [`ADDRESS_UNSET`] when nothing has been written yet.
    fn read_address(&mut self) -> Result<u8, StoreError>;

    /// Persist a new address
    fn write_address(&mut self, address: u8) -> Result<(), StoreError>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
