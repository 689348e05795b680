//! Supply and HV rail measurement.
//!
//! Both rails come from the same noisy converter. Each measurement takes a
//! throw-away conversion after the multiplexer switch, resamples once when the
//! reading looks implausible and discards near-zero readings outright (the
//! converter occasionally returns zero). Valid readings go through a 1/4 EMA
//! before they are published.

use crate::config::{
    ADC_REF_DEFAULT_MV, ADC_REF_MAX_MV, ADC_REF_MIN_MV, HV_BIAS_MV, HV_DIVIDER_HIGH_OHMS,
    HV_DIVIDER_LOW_OHMS, SUPPLY_INITIAL_MV,
};
use crate::error::Error;
use crate::hal::{AdcChannel, Sampler};
use crate::os::Shared;
use crate::rtos::TaskOutcome;

/// Readings at or below this are converter glitches
pub const GLITCH_MAX: u16 = 256;

/// Readings at or below this get a second conversion
pub const SUSPECT_MAX: u16 = 4096;

/// Readings at or above this (10-bit full scale, left aligned) get a second
/// conversion
pub const FULL_SCALE_MIN: u16 = 0xFFC0;

/// Filtered rail voltages, written by the sampler tasks and read everywhere
/// else.
pub struct Telemetry {
    supply_mv: Shared<u16>,
    high_voltage: Shared<u16>,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            supply_mv: Shared::new(SUPPLY_INITIAL_MV),
            high_voltage: Shared::new(0),
        }
    }

    /// Filtered supply voltage in millivolts
    pub fn supply_mv(&self) -> u16 {
        self.supply_mv.load()
    }

    /// Filtered HV rail voltage in volts
    pub fn high_voltage(&self) -> u16 {
        self.high_voltage.load()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one guarded acquisition
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reading {
    Valid(u16),
    Glitch,
}

/// Take one guarded raw reading from `channel`
pub fn acquire<S: Sampler>(adc: &mut S, channel: AdcChannel) -> Result<Reading, Error> {
    // first conversion after switching the multiplexer is unreliable
    convert(adc, channel)?;

    let mut raw = convert(adc, channel)?;
    if raw <= SUSPECT_MAX || raw >= FULL_SCALE_MIN {
        raw = convert(adc, channel)?;
    }

    if raw <= GLITCH_MAX {
        Ok(Reading::Glitch)
    } else {
        Ok(Reading::Valid(raw))
    }
}

fn convert<S: Sampler>(adc: &mut S, channel: AdcChannel) -> Result<u16, Error> {
    nb::block!(adc.sample(channel))
}

/// Supply voltage from a bandgap reading: `Vdd = Vref * 65536 / raw`, rounded
pub fn supply_from_raw(reference_mv: u16, raw: u16) -> u16 {
    if raw == 0 {
        return u16::MAX;
    }
    let raw = u32::from(raw);
    let mv = ((u32::from(reference_mv) << 16) + (raw >> 1)) / raw;
    u16::try_from(mv).unwrap_or(u16::MAX)
}

/// HV rail voltage from a sense tap reading taken against `supply_mv`
pub fn high_voltage_from_raw(supply_mv: u16, raw: u16) -> u16 {
    // tap voltage in 1/16 mV
    let tap = (u32::from(raw) * u32::from(supply_mv)) >> 12;
    let bias = u32::from(HV_BIAS_MV) << 4;
    if tap <= bias {
        return 0;
    }

    let total = u64::from(HV_DIVIDER_HIGH_OHMS + HV_DIVIDER_LOW_OHMS);
    let den = 16 * 1000 * u64::from(HV_DIVIDER_LOW_OHMS);
    let volts = (u64::from(tap - bias) * total + den / 2) / den;
    u16::try_from(volts).unwrap_or(u16::MAX)
}

/// Recursive filter, weight 1/4 on the new sample, rounded to nearest
pub fn ema(old: u16, sample: u16) -> u16 {
    let filtered = (3 * u32::from(old) + u32::from(sample) + 2) >> 2;
    // weighted mean of two u16 values cannot leave u16
    filtered as u16
}

/// Pick the ADC reference: fixed override, else a plausible factory
/// calibration, else the nominal value.
pub fn resolve_reference(override_mv: Option<u16>, calibrated_mv: Option<u16>) -> u16 {
    override_mv
        .or_else(|| calibrated_mv.filter(|mv| (ADC_REF_MIN_MV..=ADC_REF_MAX_MV).contains(mv)))
        .unwrap_or(ADC_REF_DEFAULT_MV)
}

/// Supply sampler task
pub fn sample_supply<S: Sampler>(
    adc: &mut S,
    telemetry: &Telemetry,
    reference_mv: u16,
) -> TaskOutcome {
    match acquire(adc, AdcChannel::Bandgap) {
        Ok(Reading::Valid(raw)) => {
            let filtered = ema(telemetry.supply_mv(), supply_from_raw(reference_mv, raw));
            telemetry.supply_mv.store(filtered);
            TaskOutcome::Done
        }
        Ok(Reading::Glitch) | Err(_) => TaskOutcome::Retry,
    }
}

/// HV rail sampler task
pub fn sample_high_voltage<S: Sampler>(adc: &mut S, telemetry: &Telemetry) -> TaskOutcome {
    match acquire(adc, AdcChannel::HighVoltage) {
        Ok(Reading::Valid(raw)) => {
            let volts = high_voltage_from_raw(telemetry.supply_mv(), raw);
            let filtered = ema(telemetry.high_voltage(), volts);
            telemetry.high_voltage.store(filtered);
            TaskOutcome::Done
        }
        Ok(Reading::Glitch) | Err(_) => TaskOutcome::Retry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::OneShotSampler;
    use embedded_hal_mock::adc::{Mock, MockChan0, MockChan1, Transaction};

    #[test]
    fn ema_weights_new_sample_by_a_quarter() {
        assert_eq!(ema(4000, 4096), 4024);
        assert_eq!(ema(0, 300), 75);
        assert_eq!(ema(300, 300), 300);
        assert_eq!(ema(1, 2), 1);
        // 1.5 rounds up
        assert_eq!(ema(1, 3), 2);
        assert_eq!(ema(u16::MAX, u16::MAX), u16::MAX);
    }

    #[test]
    fn supply_conversion_rounds() {
        assert_eq!(supply_from_raw(1190, 19040), 4096);
        assert_eq!(supply_from_raw(1190, 24372), 3200);
        assert_eq!(supply_from_raw(1190, 0), u16::MAX);
    }

    #[test]
    fn high_voltage_conversion_uses_divider() {
        assert_eq!(high_voltage_from_raw(4096, 47525), 300);
        assert_eq!(high_voltage_from_raw(4096, 32768), 207);
        assert_eq!(high_voltage_from_raw(3300, 58983), 300);
        assert_eq!(high_voltage_from_raw(4096, 0), 0);
    }

    #[test]
    fn reference_prefers_override_then_plausible_calibration() {
        assert_eq!(resolve_reference(Some(1200), Some(1250)), 1200);
        assert_eq!(resolve_reference(None, Some(1250)), 1250);
        assert_eq!(resolve_reference(None, Some(1300)), 1300);
        assert_eq!(resolve_reference(None, Some(999)), ADC_REF_DEFAULT_MV);
        assert_eq!(resolve_reference(None, Some(1301)), ADC_REF_DEFAULT_MV);
        assert_eq!(resolve_reference(None, None), ADC_REF_DEFAULT_MV);
    }

    #[test]
    fn configured_reference_defers_to_the_bandgap_value() {
        assert_eq!(
            resolve_reference(crate::config::ADC_REF_OVERRIDE_MV, Some(1230)),
            1230
        );
    }

    fn sampler(adc: &Mock<u16>) -> impl Sampler {
        OneShotSampler::new(adc.clone(), MockChan0 {}, MockChan1 {}, 76_923)
    }

    struct FailingAdc;

    impl Sampler for FailingAdc {
        fn sample(&mut self, _channel: AdcChannel) -> nb::Result<u16, Error> {
            Err(nb::Error::Other(Error::Adc))
        }

        fn sample_rate_hz(&self) -> u32 {
            0
        }
    }

    #[test]
    fn plausible_reading_skips_resample() {
        let mut adc = Mock::new(&[Transaction::read(0, 1u16), Transaction::read(0, 19040u16)]);
        let mut s = sampler(&adc);
        assert_eq!(acquire(&mut s, AdcChannel::Bandgap), Ok(Reading::Valid(19040)));
        adc.done();
    }

    #[test]
    fn low_reading_is_resampled_once() {
        let mut adc = Mock::new(&[
            Transaction::read(1, 0u16),
            Transaction::read(1, 3000u16),
            Transaction::read(1, 32768u16),
        ]);
        let mut s = sampler(&adc);
        assert_eq!(acquire(&mut s, AdcChannel::HighVoltage), Ok(Reading::Valid(32768)));
        adc.done();
    }

    #[test]
    fn full_scale_reading_is_resampled_once() {
        let mut adc = Mock::new(&[
            Transaction::read(1, 0u16),
            Transaction::read(1, 0xFFC0u16),
            Transaction::read(1, 0xFFC0u16),
        ]);
        let mut s = sampler(&adc);
        assert_eq!(acquire(&mut s, AdcChannel::HighVoltage), Ok(Reading::Valid(0xFFC0)));
        adc.done();
    }

    #[test]
    fn two_near_zero_readings_leave_supply_unchanged() {
        let telemetry = Telemetry::new();
        let mut adc = Mock::new(&[
            Transaction::read(0, 0u16),
            Transaction::read(0, 0u16),
            Transaction::read(0, 12u16),
        ]);
        let mut s = sampler(&adc);

        assert_eq!(sample_supply(&mut s, &telemetry, 1190), TaskOutcome::Retry);
        assert_eq!(telemetry.supply_mv(), SUPPLY_INITIAL_MV);
        adc.done();
    }

    #[test]
    fn converter_error_keeps_stale_value() {
        let telemetry = Telemetry::new();
        assert_eq!(acquire(&mut FailingAdc, AdcChannel::HighVoltage), Err(Error::Adc));
        assert_eq!(sample_high_voltage(&mut FailingAdc, &telemetry), TaskOutcome::Retry);
        assert_eq!(telemetry.high_voltage(), 0);
    }

    #[test]
    fn valid_readings_are_filtered_and_published() {
        let telemetry = Telemetry::new();
        let mut adc = Mock::new(&[
            Transaction::read(0, 0u16),
            Transaction::read(0, 19040u16),
            Transaction::read(1, 0u16),
            Transaction::read(1, 47525u16),
        ]);
        let mut s = sampler(&adc);

        assert_eq!(sample_supply(&mut s, &telemetry, 1190), TaskOutcome::Done);
        assert_eq!(telemetry.supply_mv(), 4024);

        // tap against 4024 mV: 47525 * 4024 >> 12 = 46689, 294.9 V -> 295
        assert_eq!(sample_high_voltage(&mut s, &telemetry), TaskOutcome::Done);
        assert_eq!(telemetry.high_voltage(), ema(0, 295));
        adc.done();
    }
}
