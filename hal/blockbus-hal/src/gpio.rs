//! GPIO pin abstractions
//!
//! The only pin the protocol core drives directly is the shield power rail
//! that feeds downstream extensions.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Placeholder rail for block classes without a switchable supply
///
/// Always reads as energized and ignores writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRail;

impl OutputPin for NoRail {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}

    fn is_set_high(&self) -> bool {
        true
    }
}
