use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

use crate::error::Error;

/// Analog inputs measured by the supervisor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdcChannel {
    /// Internal bandgap reference, measured against the supply
    Bandgap,
    /// HV rail sense divider tap
    HighVoltage,
}

/// Single conversions with 16-bit left-aligned results (full scale 65536)
pub trait Sampler {
    /// Run (or poll) one conversion on `channel`
    fn sample(&mut self, channel: AdcChannel) -> nb::Result<u16, Error>;

    /// Sample rate the converter actually runs at
    fn sample_rate_hz(&self) -> u32;

    /// Factory calibration of the internal reference, if the part stores one
    fn calibrated_reference_mv(&self) -> Option<u16> {
        None
    }
}

/// Adapts any `embedded-hal` one-shot ADC with two channel pins to [`Sampler`]
pub struct OneShotSampler<A, ADC, BG, HV> {
    adc: A,
    bandgap: BG,
    high_voltage: HV,
    rate_hz: u32,
    reference_mv: Option<u16>,
    _adc: PhantomData<ADC>,
}

impl<A, ADC, BG, HV> OneShotSampler<A, ADC, BG, HV>
where
    A: OneShot<ADC, u16, BG> + OneShot<ADC, u16, HV>,
    BG: Channel<ADC>,
    HV: Channel<ADC>,
{
    pub fn new(adc: A, bandgap: BG, high_voltage: HV, rate_hz: u32) -> Self {
        Self {
            adc,
            bandgap,
            high_voltage,
            rate_hz,
            reference_mv: None,
            _adc: PhantomData,
        }
    }

    /// Report a factory reference calibration read from the device
    pub fn with_reference(mut self, reference_mv: u16) -> Self {
        self.reference_mv = Some(reference_mv);
        self
    }
}

impl<A, ADC, BG, HV> Sampler for OneShotSampler<A, ADC, BG, HV>
where
    A: OneShot<ADC, u16, BG> + OneShot<ADC, u16, HV>,
    BG: Channel<ADC>,
    HV: Channel<ADC>,
{
    fn sample(&mut self, channel: AdcChannel) -> nb::Result<u16, Error> {
        match channel {
            AdcChannel::Bandgap => {
                <A as OneShot<ADC, u16, BG>>::read(&mut self.adc, &mut self.bandgap)
                    .map_err(|e| e.map(|_| Error::Adc))
            }
            AdcChannel::HighVoltage => {
                <A as OneShot<ADC, u16, HV>>::read(&mut self.adc, &mut self.high_voltage)
                    .map_err(|e| e.map(|_| Error::Adc))
            }
        }
    }

    fn sample_rate_hz(&self) -> u32 {
        self.rate_hz
    }

    fn calibrated_reference_mv(&self) -> Option<u16> {
        self.reference_mv
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::Adc;

#[cfg(target_arch = "avr")]
mod avr {
    use avr_device::atmega128a::ADC;

    use super::{AdcChannel, Sampler};
    use crate::config::{ADC_RATE_HZ, CPU_FREQ_HZ};
    use crate::error::Error;

    /// AVCC as reference, result left adjusted
    const ADMUX_BASE: u8 = 0x60;
    /// Bandgap on the multiplexer
    const MUX_BANDGAP: u8 = 0x1E;
    /// Typical bandgap voltage. The ATmega128 stores no calibration for it.
    const BANDGAP_MV: u16 = 1230;
    /// HV sense divider on ADC0 (PF0)
    const MUX_HV_SENSE: u8 = 0x00;

    const ADEN: u8 = 0x80;
    const ADSC: u8 = 0x40;

    /// ADC clock cycles per conversion
    const CYCLES_PER_CONVERSION: u32 = 13;

    /// Polled converter on ADC0 and the internal bandgap
    pub struct Adc {
        pending: Option<AdcChannel>,
        divider: u32,
    }

    impl Adc {
        pub fn new(_adc: ADC) -> Self {
            let (bits, divider) = prescaler_for(ADC_RATE_HZ);
            unsafe {
                let p = ADC::ptr();
                (*p).admux.write(|w| w.bits(ADMUX_BASE));
                (*p).adcsra.write(|w| w.bits(ADEN | bits));
            }
            Self {
                pending: None,
                divider,
            }
        }
    }

    impl Sampler for Adc {
        fn sample(&mut self, channel: AdcChannel) -> nb::Result<u16, Error> {
            unsafe {
                let p = ADC::ptr();
                match self.pending {
                    Some(busy) if busy != channel => Err(nb::Error::WouldBlock),
                    Some(_) if (*p).adcsra.read().bits() & ADSC != 0 => {
                        Err(nb::Error::WouldBlock)
                    }
                    Some(_) => {
                        self.pending = None;
                        Ok((*p).adc.read().bits())
                    }
                    None => {
                        let mux = match channel {
                            AdcChannel::Bandgap => MUX_BANDGAP,
                            AdcChannel::HighVoltage => MUX_HV_SENSE,
                        };
                        (*p).admux.write(|w| w.bits(ADMUX_BASE | mux));
                        (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
                        self.pending = Some(channel);
                        Err(nb::Error::WouldBlock)
                    }
                }
            }
        }

        fn sample_rate_hz(&self) -> u32 {
            CPU_FREQ_HZ / (self.divider * CYCLES_PER_CONVERSION)
        }

        fn calibrated_reference_mv(&self) -> Option<u16> {
            Some(BANDGAP_MV)
        }
    }

    /// Smallest prescaler whose conversion rate does not exceed `rate_hz`
    fn prescaler_for(rate_hz: u32) -> (u8, u32) {
        (1u8..=7)
            .map(|bits| (bits, 1u32 << bits))
            .find(|&(_, div)| CPU_FREQ_HZ / (div * CYCLES_PER_CONVERSION) <= rate_hz)
            .unwrap_or((7, 128))
    }
}
