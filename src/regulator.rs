//! Two-state hysteretic HV charge regulator

use crate::config::{HV_HYSTERESIS_V, HV_TARGET_V, SUPPLY_CUTOFF_MV};

/// Charger command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HvState {
    Enabled,
    Disabled,
}

impl HvState {
    #[inline]
    pub fn is_enabled(self) -> bool {
        self == HvState::Enabled
    }
}

/// Snapshot of everything the regulator decides on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Inputs {
    /// Hardware low-voltage detector fired
    pub brownout: bool,
    /// Filtered supply voltage, mV
    pub supply_mv: u16,
    /// Filtered HV rail voltage, V
    pub high_voltage: u16,
    /// Operator interlock
    pub interlock: bool,
}

/// Bang-bang controller with a dead band around the target.
///
/// Safety conditions always win; inside the band the previous command holds.
pub struct Regulator {
    target: u16,
    band: u16,
    supply_cutoff_mv: u16,
    state: HvState,
}

impl Regulator {
    pub const fn new(target: u16, band: u16, supply_cutoff_mv: u16) -> Self {
        Self {
            target,
            band,
            supply_cutoff_mv,
            state: HvState::Disabled,
        }
    }

    /// Update the command from fresh inputs and return it
    pub fn evaluate(&mut self, inputs: &Inputs) -> HvState {
        if inputs.brownout || inputs.supply_mv < self.supply_cutoff_mv || inputs.interlock {
            self.state = HvState::Disabled;
        } else if inputs.high_voltage < self.target.saturating_sub(self.band) {
            self.state = HvState::Enabled;
        } else if inputs.high_voltage > self.target.saturating_add(self.band) {
            self.state = HvState::Disabled;
        }
        self.state
    }

    /// Drop the command immediately, ahead of the next evaluation
    pub fn force_disabled(&mut self) {
        self.state = HvState::Disabled;
    }

    pub fn state(&self) -> HvState {
        self.state
    }
}

impl Default for Regulator {
    fn default() -> Self {
        Self::new(HV_TARGET_V, HV_HYSTERESIS_V, SUPPLY_CUTOFF_MV)
    }
}
