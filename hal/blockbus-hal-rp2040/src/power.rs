//! CPU sleep for RP2040

use blockbus_hal::CpuSleep;

/// Sleeps the core with `wfi`
///
/// Any enabled interrupt wakes it again, including the I2C slave interrupt
/// raised by the next bus transaction.
#[derive(Debug, Default)]
pub struct WfiSleep;

impl CpuSleep for WfiSleep {
    fn sleep(&mut self) {
        cortex_m::asm::wfi();
    }
}
