use avr_device::atmega128a::WDT;
use embedded_hal::watchdog::{Watchdog, WatchdogEnable};

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
}

impl WatchdogTimeout {
    /// Shortest timeout of at least `ms`, capped at the longest one
    pub fn at_least(ms: u16) -> Self {
        match ms {
            0..=16 => Self::Ms16,
            17..=32 => Self::Ms32,
            33..=64 => Self::Ms64,
            65..=125 => Self::Ms125,
            126..=250 => Self::Ms250,
            251..=500 => Self::Ms500,
            501..=1000 => Self::Ms1000,
            _ => Self::Ms2000,
        }
    }
}

const WDCE: u8 = 0x10;
const WDE: u8 = 0x08;

pub struct Wdt {
    _wdt: WDT,
}

impl Wdt {
    pub fn new(wdt: WDT) -> Self {
        Self { _wdt: wdt }
    }
}

impl WatchdogEnable for Wdt {
    type Time = WatchdogTimeout;

    fn start<T: Into<WatchdogTimeout>>(&mut self, period: T) {
        enable(period.into());
    }
}

impl Watchdog for Wdt {
    #[inline]
    fn feed(&mut self) {
        avr_device::asm::wdr();
    }
}

fn enable(timeout: WatchdogTimeout) {
    avr_device::interrupt::free(|_| unsafe {
        let p = &*WDT::ptr();
        avr_device::asm::wdr();
        // timed sequence
        p.wdtcr.write(|w| w.bits(WDCE | WDE));
        p.wdtcr.write(|w| w.bits(WDE | timeout as u8));
    });
}

/// Stop the watchdog
pub fn disable() {
    avr_device::interrupt::free(|_| unsafe {
        let p = &*WDT::ptr();
        avr_device::asm::wdr();
        p.wdtcr.write(|w| w.bits(WDCE | WDE));
        p.wdtcr.write(|w| w.bits(0));
    });
}

/// Let the watchdog reset the part as soon as possible
pub fn reset_now() -> ! {
    enable(WatchdogTimeout::Ms16);
    loop {}
}
