//! blockbus - Button Block Firmware
//!
//! Firmware for an RP2040-based button block. The block answers the shared
//! base protocol on the I2C bus and adds a small button command set under
//! its own block type id.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c_slave::{self, I2cSlave};
use embassy_rp::peripherals::I2C0;
use {defmt_rtt as _, panic_probe as _};

use blockbus_core::BusController;
use blockbus_hal_rp2040::{FlashAddressStore, RailSwitch, WatchdogReset, WfiSleep};
use blockbus_protocol::BlockType;

use crate::block::ButtonBlock;
use crate::config::{block_config, RAIL_INVERTED};

mod block;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("blockbus firmware starting...");

    let p = embassy_rp::init(Default::default());

    let config = match block_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid block configuration: {}", e);
            halt();
        }
    };

    match BlockType::from_id(config.block_type_id) {
        Some(block_type) => info!("Block type {}", block_type.name()),
        None => info!("Block type {=u8:#x}", config.block_type_id),
    }

    // Pin assignments are board-specific:
    // SDA=GPIO4, SCL=GPIO5, rail switch=GPIO2, button=GPIO15
    let store = FlashAddressStore::new(p.FLASH, p.DMA_CH0);
    let rail = RailSwitch::new(Output::new(p.PIN_2, Level::Low), RAIL_INVERTED);
    let handler = ButtonBlock::new(config.module_version());

    let mut controller = match BusController::new(&config, handler, store, rail) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Controller setup failed: {}", e);
            halt();
        }
    };

    // The slave address is fixed from here until the next restart
    let address = controller.bus_address();
    info!("Bus address {=u8:#x}", address);

    let mut i2c_config = i2c_slave::Config::default();
    i2c_config.addr = address as u16;
    let slave = I2cSlave::new(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);

    let button = Input::new(p.PIN_15, Pull::Up);

    info!("Spawning tasks...");
    spawner
        .spawn(tasks::bus_task(
            slave,
            controller,
            WfiSleep,
            WatchdogReset::new(p.WATCHDOG),
        ))
        .unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();

    info!("All tasks spawned, firmware running");
}

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
