use avr_device::atmega128a::CPU;

use super::PowerMonitor;

/// Brown-out reset flag in MCUCSR
const BORF: u8 = 0x04;

/// Brown-out detector.
///
/// The BOD resets the part instead of raising a live flag, so the detector
/// reports whether the current run started from a brown-out reset. The flag
/// is cleared in hardware at construction so a later reset starts fresh.
pub struct BrownoutDetector {
    tripped: bool,
}

impl BrownoutDetector {
    pub fn new() -> Self {
        let tripped = unsafe {
            let cpu = &*CPU::ptr();
            let flags = cpu.mcucsr.read().bits();
            cpu.mcucsr.write(|w| w.bits(flags & !BORF));
            flags & BORF != 0
        };
        Self { tripped }
    }
}

impl PowerMonitor for BrownoutDetector {
    fn brownout(&mut self) -> bool {
        self.tripped
    }
}
