//! Hardware abstraction consumed by the control core.
//!
//! The core only talks to the traits below (plus the `embedded-hal` traits
//! bundled by [`Board`]). Register-level bindings for the ATmega128 live in
//! the target-only submodules.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;

pub mod adc;

#[cfg(target_arch = "avr")]
pub mod board;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod power;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;
#[cfg(target_arch = "avr")]
pub mod watchdog;

pub use adc::{AdcChannel, OneShotSampler, Sampler};

/// Drive `pin` to `high`. GPIO writes on this board cannot fail, errors are
/// dropped.
#[inline]
pub fn set_level<P: OutputPin>(pin: &mut P, high: bool) {
    if high {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

/// Supply supervision reported by the hardware
pub trait PowerMonitor {
    /// `true` while the low-voltage detector has flagged a brownout
    fn brownout(&mut self) -> bool;
}

/// Control transfer out of the application
pub trait SystemControl {
    /// Release the pins and jump to the in-system programming loader.
    /// Does not return on hardware.
    fn enter_bootloader(&mut self);

    /// Software reset. Does not return on hardware.
    fn reset(&mut self);
}

/// Capacity of each recorded protocol byte sequence
pub const FLASH_RECORD_LEN: usize = 16;

/// Last protocol exchange and power levels computed by the flash trigger
/// module, kept for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlashRecord {
    rx: [u8; FLASH_RECORD_LEN],
    rx_len: u8,
    tx: [u8; FLASH_RECORD_LEN],
    tx_len: u8,
    /// Requested pre-flash power level
    pub power_pre: i8,
    /// Requested main flash power level
    pub power_main: i8,
    /// Pre-flash level actually applied
    pub actual_pre: i8,
    /// Main flash level actually applied
    pub actual_main: i8,
}

impl FlashRecord {
    pub const fn new() -> Self {
        Self {
            rx: [0; FLASH_RECORD_LEN],
            rx_len: 0,
            tx: [0; FLASH_RECORD_LEN],
            tx_len: 0,
            power_pre: 0,
            power_main: 0,
            actual_pre: 0,
            actual_main: 0,
        }
    }

    /// Append a byte received from the camera; ignored once full
    pub fn push_rx(&mut self, byte: u8) {
        push(&mut self.rx, &mut self.rx_len, byte);
    }

    /// Append a byte sent to the camera; ignored once full
    pub fn push_tx(&mut self, byte: u8) {
        push(&mut self.tx, &mut self.tx_len, byte);
    }

    pub fn rx(&self) -> &[u8] {
        &self.rx[..usize::from(self.rx_len)]
    }

    pub fn tx(&self) -> &[u8] {
        &self.tx[..usize::from(self.tx_len)]
    }
}

fn push(buf: &mut [u8; FLASH_RECORD_LEN], len: &mut u8, byte: u8) {
    if let Some(slot) = buf.get_mut(usize::from(*len)) {
        *slot = byte;
        *len += 1;
    }
}

/// Levels of the camera protocol lines (sync, data, clock)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LineLevels {
    pub sync: bool,
    pub data: bool,
    pub clock: bool,
}

/// Power mode of the flash trigger module
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerMode {
    /// The camera decides the power through the protocol
    Controlled,
    /// Fixed level set from the console
    Manual(i8),
}

/// Capabilities of the external flash trigger module used by the supervisor
pub trait FlashTrigger {
    /// Switch the tube gate drivers on
    fn start(&mut self);

    /// Switch the tube gate drivers off, ending any waveform in flight
    fn stop(&mut self);

    /// Tell the protocol side whether the HV rail is high enough to fire
    fn set_can_fire(&mut self, ready: bool);

    /// Leave controlled mode and use a fixed power level
    fn set_manual_power(&mut self, level: i8);

    /// Last recorded exchange
    fn record(&self) -> &FlashRecord;

    /// Sample the protocol lines
    fn line_levels(&mut self) -> LineLevels;
}

/// Type-level description of a board: which drivers back each capability
pub trait Board {
    type Adc: Sampler;
    type Serial: serial::Read<u8> + serial::Write<u8>;
    type HvEnable: OutputPin;
    type Indicator: OutputPin;
    type Delay: DelayMs<u16> + DelayUs<u16>;
    type Watchdog: Watchdog;
    type Power: PowerMonitor;
    type Flash: FlashTrigger;
    type System: SystemControl;
}

/// Driver instances for a [`Board`], owned by the supervisor
pub struct Peripherals<B: Board> {
    pub adc: B::Adc,
    pub serial: B::Serial,
    pub hv_enable: B::HvEnable,
    pub indicator: B::Indicator,
    pub delay: B::Delay,
    pub watchdog: B::Watchdog,
    pub power: B::Power,
    pub flash: B::Flash,
    pub system: B::System,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_record_keeps_bytes_until_full() {
        let mut record = FlashRecord::new();
        for byte in 0..20u8 {
            record.push_rx(byte);
        }
        record.push_tx(0xA5);
        assert_eq!(record.rx().len(), FLASH_RECORD_LEN);
        assert_eq!(record.rx()[15], 15);
        assert_eq!(record.tx(), &[0xA5]);
    }
}
