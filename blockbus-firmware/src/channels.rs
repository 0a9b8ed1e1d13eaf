//! State shared between the button task and the bus handler

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU16, Ordering};

use blockbus_protocol::PowerLevel;

/// Debounced button level
pub static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// Presses since the last counter reset, wrapping
pub static PRESS_COUNT: AtomicU16 = AtomicU16::new(0);

/// Power-save level requested by the host
pub static POWER_LEVEL: Signal<CriticalSectionRawMutex, PowerLevel> = Signal::new();

pub fn is_pressed() -> bool {
    BUTTON_PRESSED.load(Ordering::Relaxed)
}

pub fn press_count() -> u16 {
    PRESS_COUNT.load(Ordering::Relaxed)
}
