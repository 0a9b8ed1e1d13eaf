//! blockbus Wire Protocol
//!
//! This crate defines the byte-level protocol spoken between the host
//! controller (I2C master) and peripheral blocks (I2C slaves) sharing one bus.
//!
//! # Protocol Overview
//!
//! Every write transaction carries one frame:
//! ```text
//! ┌───────────┬─────────┬─────────────┐
//! │ TARGET ID │ COMMAND │ PAYLOAD     │
//! │ 1B        │ 1B      │ 0–30B       │
//! └───────────┴─────────┴─────────────┘
//! ```
//!
//! `TARGET ID` is either [`BASE_TARGET_ID`] (the base protocol every block
//! honours) or the block type id of the addressed block (its device-specific
//! protocol). Responses are not sent in the write transaction; the host
//! fetches them with a follow-up read transaction.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod blocks;
pub mod commands;
pub mod frame;

pub use blocks::{BlockType, ModuleVersion};
pub use commands::{BaseCommand, PowerLevel, BASE_TARGET_ID};
pub use frame::{
    Frame, FrameError, FrameReader, Request, Target, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
