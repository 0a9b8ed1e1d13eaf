//! Board-agnostic protocol core for bus blocks
//!
//! This crate contains everything a block needs to take part in the shared
//! bus that does not depend on a specific chip:
//!
//! - Frame dispatch for the base protocol and device-specific commands
//! - Extension address registry
//! - Power-save state machine and power rail bookkeeping
//! - Response buffering between the write and read phase of a transaction
//! - Boot-time bus address resolution from persistent storage
//! - Block configuration types
//! - Host-side client for talking to blocks

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must go first so the other modules see its macros
mod fmt;

pub mod address;
pub mod client;
pub mod config;
pub mod controller;
pub mod extension;
pub mod handler;
pub mod power;
pub mod response;

pub use client::{BlockClient, ClientError};
pub use config::{BlockConfig, Capabilities, ConfigError, ExtensionSupport};
pub use controller::{Action, BusController};
pub use extension::{AddressList, ExtensionRegistry, RegistryError};
pub use handler::BlockHandler;
pub use power::PowerStateMachine;
pub use response::{ResponseBuffer, ResponseError, RESPONSE_CAPACITY};
