//! Error type shared by the control core

use ufmt::{uDisplay, uWrite, Formatter};

/// Failures a task can run into. None of them is fatal: task boundaries turn
/// them into a retry or an abandoned console reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The ADC driver reported a conversion failure
    Adc,
    /// The serial driver failed to accept or deliver a byte
    Serial,
}

impl uDisplay for Error {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Error::Adc => f.write_str("ADC conversion failed"),
            Error::Serial => f.write_str("serial transfer failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Text;

    #[test]
    fn displays_human_readable_text() {
        let mut out = Text::default();
        ufmt::uwrite!(out, "{} / {}", Error::Adc, Error::Serial).unwrap();
        assert_eq!(out.as_str(), "ADC conversion failed / serial transfer failed");
    }
}
