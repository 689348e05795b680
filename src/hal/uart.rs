use avr_device::atmega128a::USART0;
use embedded_hal::serial::{Read, Write};

use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use crate::error::Error;

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

// UCSR0A
const RXC: u8 = 0x80;
const UDRE: u8 = 0x20;
const FE: u8 = 0x10;
const DOR: u8 = 0x08;
const UPE: u8 = 0x04;
// UCSR0B
const RXEN: u8 = 0x10;
const TXEN: u8 = 0x08;
// UCSR0C: asynchronous, 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0x06;

/// Polled USART0 at the console baud rate
pub struct Uart {
    _usart: USART0,
}

impl Uart {
    pub fn new(usart: USART0) -> Self {
        unsafe {
            let p = &*USART0::ptr();
            p.ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            p.ubrr0l.write(|w| w.bits(UBRR as u8));
            p.ucsr0c.write(|w| w.bits(FRAME_8N1));
            p.ucsr0b.write(|w| w.bits(RXEN | TXEN));
        }
        Self { _usart: usart }
    }

    fn status(&self) -> u8 {
        unsafe { (*USART0::ptr()).ucsr0a.read().bits() }
    }
}

impl Read<u8> for Uart {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        let status = self.status();
        if status & RXC == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // reading UDR clears the error flags with the byte
        let byte = unsafe { (*USART0::ptr()).udr0.read().bits() };
        if status & (FE | DOR | UPE) != 0 {
            Err(nb::Error::Other(Error::Serial))
        } else {
            Ok(byte)
        }
    }
}

impl Write<u8> for Uart {
    type Error = Error;

    fn write(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.status() & UDRE == 0 {
            return Err(nb::Error::WouldBlock);
        }
        unsafe { (*USART0::ptr()).udr0.write(|w| w.bits(byte)) };
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Error> {
        if self.status() & UDRE == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}
