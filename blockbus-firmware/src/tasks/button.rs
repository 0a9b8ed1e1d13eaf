//! Button polling task
//!
//! Debounces the button input and updates the shared state read by the
//! bus handler. Polls slower while a power-save level is active.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use blockbus_protocol::PowerLevel;

use crate::channels::{BUTTON_PRESSED, POWER_LEVEL, PRESS_COUNT};

/// Poll interval while awake
const POLL_INTERVAL_MS: u64 = 5;

/// Poll interval during power save
const SAVE_POLL_INTERVAL_MS: u64 = 50;

/// Consecutive equal samples before a level change is accepted
const DEBOUNCE_SAMPLES: u8 = 4;

#[embassy_executor::task]
pub async fn button_task(button: Input<'static>) {
    info!("Button task started");

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut stable = false;
    let mut streak = 0u8;

    loop {
        ticker.next().await;

        if let Some(level) = POWER_LEVEL.try_take() {
            let interval = match level {
                PowerLevel::None => POLL_INTERVAL_MS,
                PowerLevel::Light | PowerLevel::Deep => SAVE_POLL_INTERVAL_MS,
            };
            debug!("Button poll interval {} ms", interval);
            ticker = Ticker::every(Duration::from_millis(interval));
        }

        // Active low with pull-up
        let sample = button.is_low();
        if sample == stable {
            streak = 0;
            continue;
        }

        streak += 1;
        if streak < DEBOUNCE_SAMPLES {
            continue;
        }

        stable = sample;
        streak = 0;
        BUTTON_PRESSED.store(stable, Ordering::Relaxed);

        if stable {
            let count = PRESS_COUNT.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            debug!("Button pressed ({})", count);
        }
    }
}
