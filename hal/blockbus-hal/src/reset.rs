//! System reset abstraction

/// Forced device restart
///
/// Used to apply a new bus address: the bus peripheral binds its address at
/// initialization, so the device restarts and picks up the persisted value.
pub trait SystemReset {
    /// Reset the device. Never returns.
    fn reset(&mut self) -> !;
}
