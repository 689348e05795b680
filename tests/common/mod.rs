//! Host stand-ins for the board drivers, observable from the tests through
//! shared handles.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use embedded_hal_mock::delay::MockNoop;

use flash_hv_firmware::drivers::GateDriver;
use flash_hv_firmware::hal::{AdcChannel, Board, Peripherals, PowerMonitor, Sampler, SystemControl};
use flash_hv_firmware::Error;

/// Raw bandgap reading that converts to 4096 mV against the 1190 mV reference
pub const SUPPLY_RAW_4096_MV: u16 = 19040;
/// Raw bandgap reading for a 2900 mV supply
pub const SUPPLY_RAW_2900_MV: u16 = 26892;
/// HV tap readings around the target with a ~4.1 V supply
pub const HV_RAW_250_V: u16 = 39604;
pub const HV_RAW_350_V: u16 = 55446;

/// Converter returning a fixed level per channel
#[derive(Clone, Default)]
pub struct FakeAdc {
    pub bandgap: Rc<Cell<u16>>,
    pub high_voltage: Rc<Cell<u16>>,
    /// Reference reported at boot
    pub reference_mv: Rc<Cell<Option<u16>>>,
}

impl Sampler for FakeAdc {
    fn sample(&mut self, channel: AdcChannel) -> nb::Result<u16, Error> {
        Ok(match channel {
            AdcChannel::Bandgap => self.bandgap.get(),
            AdcChannel::HighVoltage => self.high_voltage.get(),
        })
    }

    fn sample_rate_hz(&self) -> u32 {
        76_923
    }

    fn calibrated_reference_mv(&self) -> Option<u16> {
        self.reference_mv.get()
    }
}

/// Serial port fed from a byte queue, recording everything written
#[derive(Clone, Default)]
pub struct FakeSerial {
    pub rx: Rc<RefCell<VecDeque<u8>>>,
    pub tx: Rc<RefCell<Vec<u8>>>,
    /// Next read reports a receive error
    pub rx_fault: Rc<Cell<bool>>,
    /// Bytes accepted before every further write fails; `None` never fails
    pub tx_budget: Rc<Cell<Option<usize>>>,
}

impl FakeSerial {
    pub fn send(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes);
    }

    /// Everything written since the last call
    pub fn take_output(&self) -> String {
        let bytes = std::mem::take(&mut *self.tx.borrow_mut());
        String::from_utf8(bytes).unwrap()
    }
}

impl serial::Read<u8> for FakeSerial {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        if self.rx_fault.replace(false) {
            return Err(nb::Error::Other(Error::Serial));
        }
        self.rx.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for FakeSerial {
    type Error = Error;

    fn write(&mut self, byte: u8) -> nb::Result<(), Error> {
        match self.tx_budget.get() {
            Some(0) => return Err(nb::Error::Other(Error::Serial)),
            Some(left) => self.tx_budget.set(Some(left - 1)),
            None => {}
        }
        self.tx.borrow_mut().push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Error> {
        Ok(())
    }
}

/// Pin remembering its level and every write
#[derive(Clone, Default)]
pub struct FakePin {
    pub level: Rc<Cell<bool>>,
    pub writes: Rc<RefCell<Vec<bool>>>,
}

impl FakePin {
    pub fn is_set(&self) -> bool {
        self.level.get()
    }

    pub fn take_writes(&self) -> Vec<bool> {
        std::mem::take(&mut *self.writes.borrow_mut())
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.level.set(true);
        self.writes.borrow_mut().push(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.set(false);
        self.writes.borrow_mut().push(false);
        Ok(())
    }
}

impl InputPin for FakePin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.level.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.level.get())
    }
}

#[derive(Clone, Default)]
pub struct FakeWatchdog {
    pub feeds: Rc<Cell<u32>>,
}

impl Watchdog for FakeWatchdog {
    fn feed(&mut self) {
        self.feeds.set(self.feeds.get() + 1);
    }
}

#[derive(Clone, Default)]
pub struct FakePower {
    pub brownout: Rc<Cell<bool>>,
}

impl PowerMonitor for FakePower {
    fn brownout(&mut self) -> bool {
        self.brownout.get()
    }
}

#[derive(Clone, Default)]
pub struct FakeSystem {
    pub bootloader_entries: Rc<Cell<u32>>,
    pub resets: Rc<Cell<u32>>,
}

impl SystemControl for FakeSystem {
    fn enter_bootloader(&mut self) {
        self.bootloader_entries.set(self.bootloader_entries.get() + 1);
    }

    fn reset(&mut self) {
        self.resets.set(self.resets.get() + 1);
    }
}

pub type FakeGates = GateDriver<FakePin, FakePin, FakePin, FakePin>;

pub struct MockBoard;

impl Board for MockBoard {
    type Adc = FakeAdc;
    type Serial = FakeSerial;
    type HvEnable = FakePin;
    type Indicator = FakePin;
    type Delay = MockNoop;
    type Watchdog = FakeWatchdog;
    type Power = FakePower;
    type Flash = FakeGates;
    type System = FakeSystem;
}

/// Test-side handles onto the drivers handed to the supervisor
#[derive(Clone, Default)]
pub struct Handles {
    pub adc: FakeAdc,
    pub serial: FakeSerial,
    pub hv_enable: FakePin,
    pub indicator: FakePin,
    pub gates: FakePin,
    pub sync: FakePin,
    pub data: FakePin,
    pub clock: FakePin,
    pub watchdog: FakeWatchdog,
    pub power: FakePower,
    pub system: FakeSystem,
}

impl Handles {
    /// Healthy supply, HV rail well below target
    pub fn new() -> Self {
        let handles = Self::default();
        handles.adc.bandgap.set(SUPPLY_RAW_4096_MV);
        handles.adc.high_voltage.set(HV_RAW_250_V);
        handles
    }

    pub fn peripherals(&self) -> Peripherals<MockBoard> {
        Peripherals {
            adc: self.adc.clone(),
            serial: self.serial.clone(),
            hv_enable: self.hv_enable.clone(),
            indicator: self.indicator.clone(),
            delay: MockNoop::new(),
            watchdog: self.watchdog.clone(),
            power: self.power.clone(),
            flash: GateDriver::new(
                self.gates.clone(),
                self.sync.clone(),
                self.data.clone(),
                self.clock.clone(),
            ),
            system: self.system.clone(),
        }
    }
}
