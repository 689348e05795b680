//! System tick (timer 0) and busy-wait delays (timer 2)

use avr_device::atmega128a::{TC0, TC2};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::config::{CPU_FREQ_HZ, TICK_PERIOD_MS};
use crate::os::tick_compare;

/// Clock select codes: `Div8` on timer 2, `Div1024` on timer 0
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum Prescaler {
    Div8 = 2,
    Div1024 = 7,
}

const WGM01: u8 = 0x08;
const OCIE0: u8 = 0x02;

/// Compare-match count for one tick with the /1024 prescaler
const TICK_COMPARE: u8 = match tick_compare(CPU_FREQ_HZ, 1024, TICK_PERIOD_MS) {
    Some(compare) => compare,
    None => panic!("TICK_PERIOD_MS does not fit timer 0 at /1024"),
};

/// Timer 0 in CTC mode, raising `TIMER0_COMP` every tick period
pub struct SysTick {
    _tc0: TC0,
}

impl SysTick {
    pub fn start(tc0: TC0) -> Self {
        unsafe {
            let p = &*TC0::ptr();
            p.tcnt0.write(|w| w.bits(0));
            p.ocr0.write(|w| w.bits(TICK_COMPARE));
            p.tccr0.write(|w| w.bits(WGM01 | Prescaler::Div1024 as u8));
            p.timsk.modify(|r, w| w.bits(r.bits() | OCIE0));
        }
        Self { _tc0: tc0 }
    }
}

/// Timer 2 counts per microsecond with the /8 prescaler
const COUNTS_PER_US: u32 = CPU_FREQ_HZ / 8 / 1_000_000;

/// Delay provider polling free-running timer 2
pub struct Delay {
    _tc2: TC2,
}

impl Delay {
    pub fn new(tc2: TC2) -> Self {
        unsafe {
            let p = &*TC2::ptr();
            p.tcnt2.write(|w| w.bits(0));
            p.tccr2.write(|w| w.bits(Prescaler::Div8 as u8));
        }
        Self { _tc2: tc2 }
    }

    fn count(&self) -> u8 {
        unsafe { (*TC2::ptr()).tcnt2.read().bits() }
    }

    fn wait_counts(&self, counts: u32) {
        let mut remaining = counts;
        let mut last = self.count();
        while remaining > 0 {
            let now = self.count();
            remaining = remaining.saturating_sub(u32::from(now.wrapping_sub(last)));
            last = now;
        }
    }
}

impl DelayUs<u16> for Delay {
    fn delay_us(&mut self, us: u16) {
        self.wait_counts(u32::from(us) * COUNTS_PER_US);
    }
}

impl DelayMs<u16> for Delay {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}
