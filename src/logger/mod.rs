//! Leveled trace output on the diagnostic console.
//!
//! Messages go out synchronously over the serial link and are gone once sent;
//! nothing is buffered or persisted. A message is emitted when its level is at
//! or below [`DEBUG_LEVEL`](crate::config::DEBUG_LEVEL).

/// Whether messages of `level` are emitted
#[inline]
pub const fn enabled(level: u8) -> bool {
    level != 0 && level <= crate::config::DEBUG_LEVEL
}

/// Write a `ufmt` formatted trace line when `level` is enabled.
///
/// Write failures are dropped: tracing never affects control flow.
///
/// ```ignore
/// debug!(1, console, "ADC Ref = {} mV\r\n", adc_ref);
/// ```
#[macro_export]
macro_rules! debug {
    ($level:expr, $writer:expr, $($arg:tt)*) => {
        if $crate::logger::enabled($level) {
            ufmt::uwrite!($writer, $($arg)*).ok();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEBUG_LEVEL;
    use crate::testing::Text;

    #[test]
    fn level_zero_is_never_emitted() {
        assert!(!enabled(0));
    }

    #[test]
    fn default_level_emits_boot_messages() {
        assert!(enabled(1));
        assert_eq!(enabled(DEBUG_LEVEL + 1), false);
    }

    #[test]
    fn macro_formats_enabled_messages_only() {
        let mut out = Text::default();
        debug!(1, out, "ADC Ref = {} mV\r\n", 1190u16);
        debug!(DEBUG_LEVEL + 1, out, "hidden\r\n");
        assert_eq!(out.as_str(), "ADC Ref = 1190 mV\r\n");
    }
}
