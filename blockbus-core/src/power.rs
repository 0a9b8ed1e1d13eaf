//! Power-save state machine
//!
//! Three levels, all entered through [`PowerStateMachine::set_level`]:
//!
//! - `None`: full power. Coming back from deep sleep re-energizes the rail
//!   before the block hook runs.
//! - `Light`: block hook only.
//! - `Deep`: block hook, then the extension rail is cut and the CPU is asked
//!   to sleep until the next bus interrupt.
//!
//! Whether the rail is currently cut is tracked in its own flag rather than
//! derived from the level, because blocks without a rail never toggle it.

use blockbus_hal::OutputPin;
use blockbus_protocol::PowerLevel;

/// Power-save level and rail bookkeeping of a block
#[derive(Debug, Clone)]
pub struct PowerStateMachine {
    level: PowerLevel,
    deep_sleep_active: bool,
    has_power_rail: bool,
    auto_deep_sleep: bool,
}

impl PowerStateMachine {
    /// Create a state machine at full power
    ///
    /// # Arguments
    /// - `has_power_rail`: block switches a supply rail for its extensions
    /// - `auto_deep_sleep`: request CPU sleep when entering `Deep`
    pub fn new(has_power_rail: bool, auto_deep_sleep: bool) -> Self {
        Self {
            level: PowerLevel::None,
            deep_sleep_active: false,
            has_power_rail,
            auto_deep_sleep,
        }
    }

    /// Current level
    pub fn level(&self) -> PowerLevel {
        self.level
    }

    /// True while the extension rail is cut by a deep power save
    pub fn is_deep_sleep_active(&self) -> bool {
        self.deep_sleep_active
    }

    /// Transition to `level`
    ///
    /// `hook` is the block's own power-save handler. Returns true if the CPU
    /// should now enter sleep.
    pub fn set_level<P, F>(&mut self, level: PowerLevel, rail: &mut P, mut hook: F) -> bool
    where
        P: OutputPin,
        F: FnMut(PowerLevel),
    {
        self.level = level;

        match level {
            PowerLevel::Deep => {
                hook(level);
                if self.has_power_rail && !self.deep_sleep_active {
                    rail.set_low();
                    self.deep_sleep_active = true;
                }
                self.auto_deep_sleep
            }
            PowerLevel::None => {
                if self.deep_sleep_active {
                    rail.set_high();
                    self.deep_sleep_active = false;
                }
                hook(level);
                false
            }
            PowerLevel::Light => {
                hook(level);
                false
            }
        }
    }
}
