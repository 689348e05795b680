//! Safe power-down ahead of bootloader entry or reset

use embedded_hal::blocking::delay::DelayMs;

use crate::application::Supervisor;
use crate::config::SHUTDOWN_SETTLE_MS;
use crate::hal::{set_level, Board, FlashTrigger};

impl<B: Board> Supervisor<'_, B> {
    /// Bring every output to its safe level: tube gates off, charger off,
    /// indicator off, then let the rail settle.
    ///
    /// Running it again leaves the same state behind.
    pub fn shutdown(&mut self) {
        self.hw.flash.stop();
        self.regulator.force_disabled();
        set_level(&mut self.hw.hv_enable, false);
        set_level(&mut self.hw.indicator, false);
        self.state.indicator_on = false;
        self.hw.delay.delay_ms(SHUTDOWN_SETTLE_MS);
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::BootControl;

#[cfg(target_arch = "avr")]
mod avr {
    use crate::hal::{gpio, watchdog, SystemControl};

    /// Word address of the boot section (BOOTSZ = 00, 4K words)
    const BOOTLOADER_START: usize = 0xF000;

    const IVCE: u8 = 0x01;
    const IVSEL: u8 = 0x02;

    /// Leaves the application through the boot section or a watchdog reset
    pub struct BootControl;

    impl SystemControl for BootControl {
        fn enter_bootloader(&mut self) {
            avr_device::interrupt::disable();
            watchdog::disable();
            gpio::release_all();
            unsafe {
                // move the vector table to the boot section, timed sequence
                let cpu = &*avr_device::atmega128a::CPU::ptr();
                cpu.mcucr.write(|w| w.bits(IVCE));
                cpu.mcucr.write(|w| w.bits(IVSEL));

                let entry: extern "C" fn() -> ! = core::mem::transmute(BOOTLOADER_START);
                entry()
            }
        }

        fn reset(&mut self) {
            gpio::release_all();
            watchdog::reset_now()
        }
    }
}
