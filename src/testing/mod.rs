//! Host-side helpers shared by the unit tests

use core::convert::Infallible;
use ufmt::uWrite;

/// Collects console output as text
#[derive(Default)]
pub struct Text(String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl uWrite for Text {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}
