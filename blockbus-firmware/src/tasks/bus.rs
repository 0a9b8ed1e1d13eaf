//! I2C slave task
//!
//! Feeds every write transaction to the controller and answers reads with
//! the pending response. Restart and sleep requests are carried out here,
//! after the transaction that caused them has completed.

use defmt::*;
use embassy_rp::i2c_slave::{Command, I2cSlave};
use embassy_rp::peripherals::I2C0;

use blockbus_core::{Action, BusController};
use blockbus_hal_rp2040::{FlashAddressStore, RailSwitch, WatchdogReset, WfiSleep};
use blockbus_protocol::MAX_FRAME_SIZE;

use crate::block::ButtonBlock;

/// Controller as wired on this board
pub type Controller = BusController<ButtonBlock, FlashAddressStore<'static>, RailSwitch<'static>>;

/// Byte clocked out once the response is exhausted
const IDLE_FILL: u8 = 0xFF;

#[embassy_executor::task]
pub async fn bus_task(
    mut slave: I2cSlave<'static, I2C0>,
    mut controller: Controller,
    mut cpu: WfiSleep,
    mut reset: WatchdogReset,
) {
    info!("Bus task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        match slave.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                trace!("RX: {} bytes", len);
                let action = controller.on_receive(&buf[..len]);
                act(action, &mut cpu, &mut reset);
            }
            Ok(Command::Read) => {
                respond(&mut slave, &mut controller).await;
            }
            Ok(Command::WriteRead(len)) => {
                trace!("RX: {} bytes, read follows", len);
                let action = controller.on_receive(&buf[..len]);
                respond(&mut slave, &mut controller).await;
                act(action, &mut cpu, &mut reset);
            }
            Ok(Command::GeneralCall(len)) => {
                trace!("General call ignored ({} bytes)", len);
            }
            Err(e) => {
                warn!("I2C slave error: {:?}", e);
            }
        }
    }
}

async fn respond(slave: &mut I2cSlave<'static, I2C0>, controller: &mut Controller) {
    let response = controller.on_request();
    if let Err(e) = slave.respond_and_fill(&response, IDLE_FILL).await {
        warn!("I2C respond error: {:?}", e);
    }
}

fn act(action: Action, cpu: &mut WfiSleep, reset: &mut WatchdogReset) {
    match action {
        Action::None => {}
        Action::Sleep => info!("Entering deep sleep"),
        Action::Restart { address } => info!("Restarting at address {=u8:#x}", address),
    }
    action.perform(cpu, reset);
}
