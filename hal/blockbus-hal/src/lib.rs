//! blockbus Hardware Abstraction Layer
//!
//! This crate defines the hardware boundary of a bus block. The protocol
//! core in `blockbus-core` only talks to hardware through these traits, so
//! the same dispatch logic runs on the RP2040 firmware and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  blockbus-firmware / host tooling       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  blockbus-core (BusController, client)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  blockbus-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌───────────────────┐
//!           │ blockbus-hal-     │
//!           │     rp2040        │
//!           └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Power rail switch for downstream extensions
//! - [`i2c::I2cBus`] - I2C master operations (host side)
//! - [`storage::AddressStore`] - Persisted bus address
//! - [`power::CpuSleep`] - CPU low-power entry
//! - [`reset::SystemReset`] - Forced device restart

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod power;
pub mod reset;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use power::CpuSleep;
pub use reset::SystemReset;
pub use storage::{AddressStore, StorageKey, StoreError, ADDRESS_UNSET};
