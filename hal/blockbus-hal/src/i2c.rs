//! I2C bus abstractions
//!
//! Blocks themselves run the bus in slave mode through the chip HAL. This
//! trait is the master side used by the host controller to talk to blocks.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral blocks.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Highest valid 7-bit address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Check that an address fits the 7-bit address space
pub fn is_valid_address(address: u8) -> bool {
    address <= MAX_ADDRESS
}
