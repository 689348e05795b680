use embedded_hal::serial::{Read, Write};
use ufmt::uWrite;

use crate::error::Error;

/// Text front end over a byte-oriented serial port.
///
/// Borrows the port for the duration of one command so the supervisor keeps
/// ownership of the driver.
pub struct SerialConsole<'a, S> {
    serial: &'a mut S,
}

impl<'a, S> SerialConsole<'a, S>
where
    S: Read<u8> + Write<u8>,
{
    pub fn new(serial: &'a mut S) -> Self {
        Self { serial }
    }

    /// Take one pending byte, without waiting
    pub fn read_byte(&mut self) -> Option<u8> {
        self.serial.read().ok()
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        nb::block!(self.serial.write(byte)).map_err(|_| Error::Serial)
    }
}

impl<S> uWrite for SerialConsole<'_, S>
where
    S: Read<u8> + Write<u8>,
{
    type Error = Error;

    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        s.bytes().try_for_each(|byte| self.write_byte(byte))
    }
}
