//! Extension power rail switch

use embassy_rp::gpio::Output;

use blockbus_hal::OutputPin;

/// GPIO driving the load switch of the extension supply
///
/// `inverted` is for P-channel switches that conduct while the pin is low.
/// The trait level is always "rail energized = high".
pub struct RailSwitch<'d> {
    pin: Output<'d>,
    inverted: bool,
}

impl<'d> RailSwitch<'d> {
    pub fn new(pin: Output<'d>, inverted: bool) -> Self {
        Self { pin, inverted }
    }
}

impl<'d> OutputPin for RailSwitch<'d> {
    fn set_high(&mut self) {
        if self.inverted {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
    }

    fn set_low(&mut self) {
        if self.inverted {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }
}
