//! Single-byte command interpreter on the diagnostic serial link

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::application::Supervisor;
use crate::config::{
    FLASH_LEVEL_FULL, INTERLOCK_SETTLE_MS, MANUAL_POWER_WRAP, TEST_FIRE_FIRST_US,
    TEST_FIRE_GAP_MS, TEST_FIRE_SECOND_US,
};
use crate::diagnostics;
use crate::drivers::SerialConsole;
use crate::error::Error;
use crate::hal::{set_level, Board, FlashTrigger, PowerMonitor, SystemControl};
use crate::rtos::TaskOutcome;

/// Console commands, one letter each
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `b`: tick and loop counters
    Status,
    /// `d`: shut down and enter the bootloader
    Bootloader,
    /// `r`: shut down and reset
    Reset,
    /// `a`: voltage report
    Voltages,
    /// `p`: pin levels
    Pins,
    /// `c`: set the HV interlock
    Interlock,
    /// `x`: clear the HV interlock
    Release,
    /// `f`: double test pulse on the tube gates
    TestFire,
    /// `s`: last flash protocol exchange
    Trace,
    /// `m`: step the manual power level
    ManualPower,
    /// `?`
    Help,
}

impl Command {
    /// Decode a received byte, ignoring case. Unknown bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let command = match byte.to_ascii_lowercase() {
            b'b' => Command::Status,
            b'd' => Command::Bootloader,
            b'r' => Command::Reset,
            b'a' => Command::Voltages,
            b'p' => Command::Pins,
            b'c' => Command::Interlock,
            b'x' => Command::Release,
            b'f' => Command::TestFire,
            b's' => Command::Trace,
            b'm' => Command::ManualPower,
            b'?' => Command::Help,
            _ => return None,
        };
        Some(command)
    }
}

/// Manual power level following `level`: one step up, wrapping back to the
/// low end once past full power.
pub fn next_manual_power(level: i8) -> i8 {
    let next = level.saturating_add(1);
    if next > FLASH_LEVEL_FULL {
        MANUAL_POWER_WRAP
    } else {
        next
    }
}

impl<B: Board> Supervisor<'_, B> {
    /// Console task: handle at most one pending byte. Never waits for input.
    pub(crate) fn poll_console(&mut self) -> TaskOutcome {
        let byte = SerialConsole::new(&mut self.hw.serial).read_byte();
        if let Some(command) = byte.and_then(Command::from_byte) {
            // a failed reply is simply abandoned
            self.execute(command).ok();
        }
        TaskOutcome::Done
    }

    /// Carry out `command` and print its reply
    pub fn execute(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Status => {
                let ticks = self.ticks.now();
                let loops = self.state.loops;
                diagnostics::status(&mut self.console(), ticks, loops)
            }
            Command::Bootloader => {
                self.shutdown();
                self.hw.system.enter_bootloader();
                Ok(())
            }
            Command::Reset => {
                self.shutdown();
                self.hw.system.reset();
                Ok(())
            }
            Command::Voltages => self.report_voltages(),
            Command::Pins => {
                let hv_on = self.regulator.state().is_enabled();
                let brownout = self.hw.power.brownout();
                let lines = self.hw.flash.line_levels();
                let indicator = self.state.indicator_on;
                diagnostics::pins(&mut self.console(), hv_on, brownout, indicator, lines)
            }
            Command::Interlock => self.set_interlock(true),
            Command::Release => self.set_interlock(false),
            Command::TestFire => {
                self.test_fire();
                Ok(())
            }
            Command::Trace => {
                let mut console = SerialConsole::new(&mut self.hw.serial);
                diagnostics::trace(&mut console, self.hw.flash.record())
            }
            Command::ManualPower => {
                let level = next_manual_power(self.state.manual_power);
                self.state.manual_power = level;
                self.hw.flash.set_manual_power(level);
                diagnostics::manual_power(&mut self.console(), level)
            }
            Command::Help => diagnostics::help(&mut self.console()),
        }
    }

    /// Both directions drop the charger at once; after a release the
    /// regulator decides again on the next pass.
    fn set_interlock(&mut self, engaged: bool) -> Result<(), Error> {
        self.state.hv_disable = engaged;
        self.regulator.force_disabled();
        set_level(&mut self.hw.hv_enable, false);
        self.hw.delay.delay_ms(INTERLOCK_SETTLE_MS);
        self.report_voltages()
    }

    fn report_voltages(&mut self) -> Result<(), Error> {
        let hv_on = self.regulator.state().is_enabled();
        let supply_mv = self.telemetry.supply_mv();
        let high_voltage = self.telemetry.high_voltage();
        diagnostics::voltages(&mut self.console(), hv_on, supply_mv, high_voltage)
    }

    fn test_fire(&mut self) {
        let flash = &mut self.hw.flash;
        let delay = &mut self.hw.delay;

        flash.start();
        delay.delay_us(TEST_FIRE_FIRST_US);
        flash.stop();
        delay.delay_ms(TEST_FIRE_GAP_MS);
        flash.start();
        delay.delay_us(TEST_FIRE_SECOND_US);
        flash.stop();
    }

    fn console(&mut self) -> SerialConsole<'_, B::Serial> {
        SerialConsole::new(&mut self.hw.serial)
    }
}
