//! RP2040-specific HAL for blockbus blocks
//!
//! Implements the `blockbus-hal` traits on top of embassy-rp:
//!
//! - Flash-backed bus address store (implements `blockbus_hal::AddressStore`)
//! - Extension power rail switch
//! - WFI-based CPU sleep
//! - Watchdog-based system reset

#![no_std]

pub mod flash;
pub mod gpio;
pub mod power;
pub mod reset;

// Re-export shared traits from blockbus-hal for convenience
pub use blockbus_hal::{AddressStore, CpuSleep, OutputPin, StorageKey, SystemReset};

pub use flash::FlashAddressStore;
pub use gpio::RailSwitch;
pub use power::WfiSleep;
pub use reset::WatchdogReset;
