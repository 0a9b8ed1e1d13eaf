//! Bus address resolution
//!
//! The bus peripheral binds its slave address once at start-up. A changed
//! address is therefore only persisted by the protocol core; it takes effect
//! on the next boot, when this module reads it back.

use blockbus_hal::{AddressStore, ADDRESS_UNSET};

/// Bus address to bind at start-up
///
/// An unset slot, or a store that cannot be read, yields the block type id.
pub fn resolve_bus_address<S: AddressStore>(store: &mut S, block_type_id: u8) -> u8 {
    match store.read_address() {
        Ok(ADDRESS_UNSET) => block_type_id,
        Ok(address) => address,
        Err(e) => {
            warn!("address store unreadable ({}), using default", e);
            block_type_id
        }
    }
}
