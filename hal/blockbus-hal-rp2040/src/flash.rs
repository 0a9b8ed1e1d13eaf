//! Flash-backed address store for RP2040
//!
//! The bus address is kept with sequential-storage in the last two erase
//! sectors of flash. The protocol core calls the store synchronously from
//! the bus handler, so the async flash driver is driven with `block_on`.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use blockbus_hal::storage::{AddressStore, StorageKey, StoreError, ADDRESS_UNSET};

/// Flash storage layout
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const ADDRESS_PARTITION_SIZE: usize = 2 * ERASE_SIZE;
pub const ADDRESS_PARTITION_START: usize = FLASH_SIZE - ADDRESS_PARTITION_SIZE;

/// Flash range for the address partition
pub const ADDRESS_RANGE: core::ops::Range<u32> =
    (ADDRESS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one stored item
const DATA_BUFFER_SIZE: usize = 32;

/// RP2040 bus address store
pub struct FlashAddressStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashAddressStore<'d> {
    /// Create a new address store
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Wipe the partition, returning the block to its default address
    pub fn erase(&mut self) -> Result<(), StoreError> {
        block_on(
            self.flash
                .erase(ADDRESS_PARTITION_START as u32, FLASH_SIZE as u32),
        )
        .map_err(|_| StoreError::Flash)
    }
}

impl<'d> AddressStore for FlashAddressStore<'d> {
    fn read_address(&mut self) -> Result<u8, StoreError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];

        let result = block_on(map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            ADDRESS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::BusAddress,
        ));

        match result {
            Ok(Some(data)) => data.first().copied().ok_or(StoreError::Corrupted),
            Ok(None) => Ok(ADDRESS_UNSET),
            Err(_) => Err(StoreError::Storage),
        }
    }

    fn write_address(&mut self, address: u8) -> Result<(), StoreError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];
        let data: &[u8] = &[address];

        block_on(map::store_item(
            &mut self.flash,
            ADDRESS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::BusAddress,
            &data,
        ))
        .map_err(|_| StoreError::Storage)
    }
}
