//! ATmega128 board wiring

use avr_device::atmega128a::{Peripherals as Device, PORTB, PORTC, PORTD};
use embedded_hal::watchdog::WatchdogEnable;

use super::adc::Adc;
use super::gpio::{Input, Output, Pin, PortMask};
use super::power::BrownoutDetector;
use super::timer::{Delay, SysTick};
use super::uart::Uart;
use super::watchdog::{WatchdogTimeout, Wdt};
use super::{Board, Peripherals};
use crate::bootloader::BootControl;
use crate::config::WDT_TIMEOUT_MS;
use crate::drivers::GateDriver;

/// IGBT gate drivers of the tube, PC0..PC3
const GATE_MASK: u8 = 0x0F;

pub type HvEnablePin = Pin<PORTB, 4, Output>;
pub type IndicatorPin = Pin<PORTB, 5, Output>;
pub type SyncPin = Pin<PORTD, 0, Input>;
pub type DataPin = Pin<PORTD, 1, Input>;
pub type ClockPin = Pin<PORTD, 2, Input>;
pub type FlashGates = GateDriver<PortMask<PORTC>, SyncPin, DataPin, ClockPin>;

pub struct Atmega128;

impl Board for Atmega128 {
    type Adc = Adc;
    type Serial = Uart;
    type HvEnable = HvEnablePin;
    type Indicator = IndicatorPin;
    type Delay = Delay;
    type Watchdog = Wdt;
    type Power = BrownoutDetector;
    type Flash = FlashGates;
    type System = BootControl;
}

impl Atmega128 {
    /// Bring up every driver with all outputs low and the watchdog running.
    /// Returns the tick timer separately; it only has to stay alive.
    pub fn take(dp: Device) -> (Peripherals<Self>, SysTick) {
        let mut watchdog = Wdt::new(dp.WDT);
        watchdog.start(WatchdogTimeout::at_least(WDT_TIMEOUT_MS));

        let flash: FlashGates = GateDriver::new(
            PortMask::<PORTC>::new(GATE_MASK),
            Pin::new(),
            Pin::new(),
            Pin::new(),
        );

        let hw = Peripherals {
            adc: Adc::new(dp.ADC),
            serial: Uart::new(dp.USART0),
            hv_enable: Pin::<PORTB, 4, Input>::new().into_output(),
            indicator: Pin::<PORTB, 5, Input>::new().into_output(),
            delay: Delay::new(dp.TC2),
            watchdog,
            power: BrownoutDetector::new(),
            flash,
            system: BootControl,
        };
        (hw, SysTick::start(dp.TC0))
    }
}
