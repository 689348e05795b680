//! Human-readable reports printed by the console.
//!
//! All reports are one-shot text; nothing here keeps history.

use ufmt::{uWrite, uwrite};

use crate::hal::{FlashRecord, LineLevels};

/// Command letters, as printed by the help command
pub const COMMAND_LIST: &str = "bdrapcxfsm?";

/// `ticks = T, loops = L`
pub fn status<W: uWrite + ?Sized>(w: &mut W, ticks: u16, loops: u16) -> Result<(), W::Error> {
    uwrite!(w, "ticks = {}, loops = {}\r\n", ticks, loops)
}

/// HV enable, supply and HV rail
pub fn voltages<W: uWrite + ?Sized>(
    w: &mut W,
    hv_on: bool,
    supply_mv: u16,
    high_voltage: u16,
) -> Result<(), W::Error> {
    uwrite!(
        w,
        "VH = {}, VDD = {} mV, VH = {} V\r\n",
        u8::from(hv_on),
        supply_mv,
        high_voltage
    )
}

/// Output and input levels relevant to charging and triggering
pub fn pins<W: uWrite + ?Sized>(
    w: &mut W,
    hv_on: bool,
    brownout: bool,
    indicator: bool,
    lines: LineLevels,
) -> Result<(), W::Error> {
    uwrite!(
        w,
        "VH = {}, LVD = {}, LED = {}\r\n",
        u8::from(hv_on),
        u8::from(brownout),
        u8::from(indicator)
    )?;
    uwrite!(
        w,
        "F1SYNC = {}, F2DAT = {}, F3CLK = {}\r\n",
        u8::from(lines.sync),
        u8::from(lines.data),
        u8::from(lines.clock)
    )
}

/// Last recorded camera exchange and the power levels derived from it
pub fn trace<W: uWrite + ?Sized>(w: &mut W, record: &FlashRecord) -> Result<(), W::Error> {
    w.write_str("RX :")?;
    hex_bytes(w, record.rx())?;
    w.write_str("\r\nTX :")?;
    hex_bytes(w, record.tx())?;
    uwrite!(
        w,
        "\r\nPower pre = {}, main = {}\r\n",
        record.power_pre,
        record.power_main
    )?;
    uwrite!(
        w,
        "Actual pre = {}, main = {}\r\n",
        record.actual_pre,
        record.actual_main
    )
}

/// Echo of the manual power command
pub fn manual_power<W: uWrite + ?Sized>(w: &mut W, level: i8) -> Result<(), W::Error> {
    uwrite!(w, "Manual mode, power = {}\r\n", level)
}

pub fn help<W: uWrite + ?Sized>(w: &mut W) -> Result<(), W::Error> {
    w.write_str(COMMAND_LIST)?;
    w.write_str("\r\n")
}

fn hex_bytes<W: uWrite + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<(), W::Error> {
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    for &byte in bytes {
        w.write_char(' ')?;
        w.write_char(char::from(HEX_CHARS[usize::from(byte >> 4)]))?;
        w.write_char(char::from(HEX_CHARS[usize::from(byte & 0xF)]))?;
    }
    Ok(())
}
