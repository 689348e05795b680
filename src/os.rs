//! System tick and interrupt-safe shared cells

use core::cell::Cell;
use critical_section::Mutex;

/// A value exchanged between the main loop and interrupt context.
///
/// Every access runs in its own critical section that spans exactly one load
/// or store, so the interrupt-disabled window never includes computation.
pub struct Shared<T> {
    value: Mutex<Cell<T>>,
}

impl<T: Copy> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Cell::new(value)),
        }
    }

    #[inline]
    pub fn load(&self) -> T {
        critical_section::with(|cs| self.value.borrow(cs).get())
    }

    #[inline]
    pub fn store(&self, value: T) {
        critical_section::with(|cs| self.value.borrow(cs).set(value));
    }
}

/// 16-bit wrap-around tick counter, advanced by the periodic timer interrupt.
pub struct TickCounter {
    ticks: Shared<u16>,
}

impl TickCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self {
            ticks: Shared::new(0),
        }
    }

    /// Advance by one tick. Only the tick interrupt calls this.
    #[inline]
    pub fn increment(&self) {
        critical_section::with(|cs| {
            let cell = self.ticks.value.borrow(cs);
            cell.set(cell.get().wrapping_add(1));
        });
    }

    /// Current tick count; may lag the hardware by at most one tick period
    #[inline]
    pub fn now(&self) -> u16 {
        self.ticks.load()
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Output-compare value giving a `period_ms` tick on an 8-bit timer clocked at
/// `cpu_freq_hz / prescaler`. `None` when the period needs more than 256
/// counts or less than one.
pub const fn tick_compare(cpu_freq_hz: u32, prescaler: u32, period_ms: u16) -> Option<u8> {
    let counts = (cpu_freq_hz / prescaler).saturating_mul(period_ms as u32) / 1000;
    if counts == 0 || counts > 256 {
        None
    } else {
        Some((counts - 1) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_cell_returns_last_store() {
        let cell = Shared::new(4000u16);
        assert_eq!(cell.load(), 4000);
        cell.store(3312);
        assert_eq!(cell.load(), 3312);
    }

    #[test]
    fn tick_compare_fits_eight_bits_or_refuses() {
        assert_eq!(tick_compare(16_000_000, 1024, 10), Some(155));
        assert_eq!(tick_compare(16_000_000, 1024, 16), Some(249));
        // 312 counts would wrap to 55
        assert_eq!(tick_compare(16_000_000, 1024, 20), None);
        assert_eq!(tick_compare(16_000_000, 1024, 0), None);
        assert_eq!(tick_compare(1_000_000, 1024, 1), None);
    }

    #[test]
    fn tick_counter_wraps_at_16_bits() {
        let ticks = TickCounter::new();
        ticks.ticks.store(u16::MAX - 1);
        ticks.increment();
        assert_eq!(ticks.now(), u16::MAX);
        ticks.increment();
        assert_eq!(ticks.now(), 0);
    }
}
