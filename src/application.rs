//! Main control loop of the HV supervisor.
//!
//! [`Supervisor`] owns the board drivers and every piece of loop state. One
//! call to [`Supervisor::step`] is one main-loop pass: feed the watchdog,
//! regulate, then run exactly one task slot.

use embedded_hal::watchdog::Watchdog;

use crate::config::{
    ADC_REF_OVERRIDE_MV, HV_MIN_FIRE_V, INDICATOR_BLINK_MASK, MANUAL_POWER_START,
};
use crate::debug;
use crate::drivers::SerialConsole;
use crate::hal::{set_level, Board, FlashTrigger, Peripherals, PowerMonitor, Sampler};
use crate::os::TickCounter;
use crate::regulator::{HvState, Inputs, Regulator};
use crate::rtos::{RoundRobin, TaskId, TaskOutcome};
use crate::telemetry::{self, Telemetry};

/// Loop state that lives for the whole process and is only touched by the
/// main loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlState {
    /// Operator interlock, set and cleared from the console
    pub hv_disable: bool,
    /// Last level written to the indicator
    pub indicator_on: bool,
    /// Main-loop passes, wrapping
    pub loops: u16,
    /// ADC reference in use, fixed at startup
    pub adc_ref_mv: u16,
    /// Level last sent to the flash module in manual mode
    pub manual_power: i8,
}

impl ControlState {
    pub const fn new(adc_ref_mv: u16) -> Self {
        Self {
            hv_disable: false,
            indicator_on: false,
            loops: 0,
            adc_ref_mv,
            manual_power: MANUAL_POWER_START,
        }
    }
}

pub struct Supervisor<'a, B: Board> {
    pub(crate) hw: Peripherals<B>,
    pub(crate) state: ControlState,
    pub(crate) telemetry: &'a Telemetry,
    pub(crate) ticks: &'a TickCounter,
    pub(crate) scheduler: RoundRobin,
    pub(crate) regulator: Regulator,
}

impl<'a, B: Board> Supervisor<'a, B> {
    /// Take over the board with both outputs low and print the boot banner
    pub fn new(hw: Peripherals<B>, telemetry: &'a Telemetry, ticks: &'a TickCounter) -> Self {
        let adc_ref_mv =
            telemetry::resolve_reference(ADC_REF_OVERRIDE_MV, hw.adc.calibrated_reference_mv());

        let mut supervisor = Self {
            hw,
            state: ControlState::new(adc_ref_mv),
            telemetry,
            ticks,
            scheduler: RoundRobin::new(),
            regulator: Regulator::default(),
        };
        set_level(&mut supervisor.hw.hv_enable, false);
        set_level(&mut supervisor.hw.indicator, false);

        let rate_khz = supervisor.hw.adc.sample_rate_hz() / 1000;
        let mut console = SerialConsole::new(&mut supervisor.hw.serial);
        debug!(1, console, "Starting\r\n");
        debug!(1, console, "ADC Rate = {} kHz\r\n", rate_khz);
        debug!(1, console, "ADC Ref = {} mV\r\n", adc_ref_mv);

        supervisor
    }

    /// Run the main loop forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One main-loop pass. Returns the task that ran and how it ended.
    pub fn step(&mut self) -> (TaskId, TaskOutcome) {
        self.hw.watchdog.feed();
        self.state.loops = self.state.loops.wrapping_add(1);
        self.regulate();

        let task = self.scheduler.advance();
        let outcome = match task {
            TaskId::Supply => {
                telemetry::sample_supply(&mut self.hw.adc, self.telemetry, self.state.adc_ref_mv)
            }
            TaskId::HighVoltage => telemetry::sample_high_voltage(&mut self.hw.adc, self.telemetry),
            TaskId::Indicator => self.update_indicator(),
            TaskId::Console => self.poll_console(),
        };
        (task, outcome)
    }

    /// Re-evaluate the charger command and write it to the actuator
    fn regulate(&mut self) {
        let inputs = Inputs {
            brownout: self.hw.power.brownout(),
            supply_mv: self.telemetry.supply_mv(),
            high_voltage: self.telemetry.high_voltage(),
            interlock: self.state.hv_disable,
        };
        let command = self.regulator.evaluate(&inputs);
        set_level(&mut self.hw.hv_enable, command.is_enabled());
    }

    /// Indicator task: steady while the rail is ready or charging is off,
    /// blinking while it charges. Also tells the flash module whether it may
    /// fire.
    fn update_indicator(&mut self) -> TaskOutcome {
        let ready = self.telemetry.high_voltage() >= HV_MIN_FIRE_V;
        self.hw.flash.set_can_fire(ready);

        let on = if !ready && self.regulator.state().is_enabled() {
            self.ticks.now() & INDICATOR_BLINK_MASK != 0
        } else {
            true
        };
        self.state.indicator_on = on;
        set_level(&mut self.hw.indicator, on);
        TaskOutcome::Done
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn hv_state(&self) -> HvState {
        self.regulator.state()
    }

    pub fn peripherals(&self) -> &Peripherals<B> {
        &self.hw
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<B> {
        &mut self.hw
    }
}
