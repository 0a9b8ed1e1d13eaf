//! Watchdog-driven restart for RP2040

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::Watchdog;
use embassy_rp::Peri;

use blockbus_hal::SystemReset;

/// Restarts the chip through the watchdog
pub struct WatchdogReset {
    watchdog: Watchdog,
}

impl WatchdogReset {
    pub fn new(watchdog: Peri<'static, WATCHDOG>) -> Self {
        Self {
            watchdog: Watchdog::new(watchdog),
        }
    }
}

impl SystemReset for WatchdogReset {
    fn reset(&mut self) -> ! {
        self.watchdog.trigger_reset();
        loop {
            cortex_m::asm::nop();
        }
    }
}
