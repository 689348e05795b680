//! Typestate port pins for the ATmega128

use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF, PORTG};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub struct Input;
pub struct Output;

/// Pin `P` of `PORT`, configured as `MODE`
pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

/// Several pins of one port switched together in a single write
pub struct PortMask<PORT> {
    mask: u8,
    _port: PhantomData<PORT>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// Pins come out of reset as floating inputs
    pub(crate) fn new() -> Self {
        Self {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $pin:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE> Pin<$PORT, P, MODE> {
            /// Output, driven low
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    let p = &*$PORT::ptr();
                    p.$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    p.$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P))) };
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P))) };
                Ok(())
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() } & (1 << P) != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }

        impl PortMask<$PORT> {
            /// Claim the pins in `mask` as outputs, driven low
            pub(crate) fn new(mask: u8) -> Self {
                unsafe {
                    let p = &*$PORT::ptr();
                    p.$port.modify(|r, w| w.bits(r.bits() & !mask));
                    p.$ddr.modify(|r, w| w.bits(r.bits() | mask));
                }
                Self {
                    mask,
                    _port: PhantomData,
                }
            }
        }

        impl OutputPin for PortMask<$PORT> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                let mask = self.mask;
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | mask)) };
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                let mask = self.mask;
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !mask)) };
                Ok(())
            }
        }
    };
}

impl_port!(PORTA, pina, ddra, porta);
impl_port!(PORTB, pinb, ddrb, portb);
impl_port!(PORTC, pinc, ddrc, portc);
impl_port!(PORTD, pind, ddrd, portd);
impl_port!(PORTE, pine, ddre, porte);
impl_port!(PORTF, pinf, ddrf, portf);
impl_port!(PORTG, ping, ddrg, portg);

/// Return every pin to a floating input, as after reset
pub fn release_all() {
    macro_rules! release {
        ($($PORT:ident: $ddr:ident, $port:ident;)*) => {
            $(unsafe {
                let p = &*$PORT::ptr();
                p.$ddr.write(|w| w.bits(0));
                p.$port.write(|w| w.bits(0));
            })*
        };
    }

    release! {
        PORTA: ddra, porta;
        PORTB: ddrb, portb;
        PORTC: ddrc, portc;
        PORTD: ddrd, portd;
        PORTE: ddre, porte;
        PORTF: ddrf, portf;
        PORTG: ddrg, portg;
    }
}
