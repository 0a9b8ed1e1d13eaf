//! CPU low-power abstractions

/// CPU sleep primitive
///
/// Entered after a deep power-save request. Implementations return once an
/// external interrupt (typically the next bus transaction) wakes the core.
pub trait CpuSleep {
    /// Halt the CPU until the next wake-up interrupt
    fn sleep(&mut self);
}
