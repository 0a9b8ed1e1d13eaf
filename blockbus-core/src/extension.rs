//! Extension address registry
//!
//! An extension is a sub-device reached through a block (for example a
//! sensor board on the block's shield connector). Each extension slot has a
//! fixed list of candidate bus addresses; the host selects one slot at a
//! time and then queries or re-addresses it through the base protocol.

use heapless::Vec;

/// Maximum number of extension slots per block
pub const MAX_EXTENSIONS: usize = 8;

/// Maximum number of candidate addresses per extension slot
pub const MAX_EXTENSION_ADDRESSES: usize = 8;

/// Terminator of address lists in legacy zero-terminated form
pub const LIST_TERMINATOR: u8 = 0x00;

/// Errors from the extension registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Requested extension index does not exist
    OutOfRange,
    /// More than [`MAX_EXTENSIONS`] lists
    TooManyExtensions,
    /// More than [`MAX_EXTENSION_ADDRESSES`] addresses in one list
    TooManyAddresses,
}

/// Candidate addresses of one extension slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    addresses: Vec<u8, MAX_EXTENSION_ADDRESSES>,
}

impl AddressList {
    /// Build a list from addresses
    ///
    /// A [`LIST_TERMINATOR`] byte ends the list early, so zero-terminated
    /// tables can be passed unchanged.
    pub fn new(addresses: &[u8]) -> Result<Self, RegistryError> {
        let end = addresses
            .iter()
            .position(|&a| a == LIST_TERMINATOR)
            .unwrap_or(addresses.len());

        let mut list = Vec::new();
        list.extend_from_slice(&addresses[..end])
            .map_err(|_| RegistryError::TooManyAddresses)?;
        Ok(Self { addresses: list })
    }

    /// Addresses in host-visible order
    pub fn as_slice(&self) -> &[u8] {
        &self.addresses
    }

    /// Number of addresses
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True if the list has no addresses
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Extension slots of a block and the currently selected one
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    lists: Vec<AddressList, MAX_EXTENSIONS>,
    active: Option<usize>,
}

impl ExtensionRegistry {
    /// Registry of a block without extensions
    pub fn empty() -> Self {
        Self {
            lists: Vec::new(),
            active: None,
        }
    }

    /// Create a registry with one slot per address list
    ///
    /// The first slot starts out active.
    pub fn new<L: AsRef<[u8]>>(lists: &[L]) -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for list in lists {
            registry
                .lists
                .push(AddressList::new(list.as_ref())?)
                .map_err(|_| RegistryError::TooManyExtensions)?;
        }
        registry.active = if registry.lists.is_empty() { None } else { Some(0) };
        Ok(registry)
    }

    /// Number of extension slots
    pub fn count(&self) -> usize {
        self.lists.len()
    }

    /// Select the slot at `index`
    ///
    /// On failure the previous selection stays active.
    pub fn activate(&mut self, index: usize) -> Result<(), RegistryError> {
        if index >= self.lists.len() {
            return Err(RegistryError::OutOfRange);
        }
        self.active = Some(index);
        Ok(())
    }

    /// Index of the selected slot
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Candidate addresses of the selected slot
    pub fn active_list(&self) -> Option<&[u8]> {
        self.active
            .and_then(|index| self.lists.get(index))
            .map(AddressList::as_slice)
    }

    /// Number of candidate addresses of the selected slot
    pub fn active_list_len(&self) -> Option<usize> {
        self.active_list().map(<[u8]>::len)
    }

    /// Candidate addresses of the slot at `index`
    pub fn list(&self, index: usize) -> Option<&[u8]> {
        self.lists.get(index).map(AddressList::as_slice)
    }
}
