use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::hal::{FlashRecord, FlashTrigger, LineLevels, PowerMode};

/// Gate side of the flash trigger module.
///
/// Drives the IGBT gate group of the tube and keeps the diagnostics the
/// camera protocol handler leaves behind. The protocol timing itself lives in
/// the trigger module and feeds this driver through [`record_mut`].
///
/// [`record_mut`]: GateDriver::record_mut
pub struct GateDriver<G, SYNC, DAT, CLK> {
    gates: G,
    sync: SYNC,
    data: DAT,
    clock: CLK,
    record: FlashRecord,
    mode: PowerMode,
    can_fire: bool,
}

impl<G, SYNC, DAT, CLK> GateDriver<G, SYNC, DAT, CLK>
where
    G: OutputPin,
    SYNC: InputPin,
    DAT: InputPin,
    CLK: InputPin,
{
    pub fn new(gates: G, sync: SYNC, data: DAT, clock: CLK) -> Self {
        Self {
            gates,
            sync,
            data,
            clock,
            record: FlashRecord::new(),
            mode: PowerMode::Controlled,
            can_fire: false,
        }
    }

    pub fn record_mut(&mut self) -> &mut FlashRecord {
        &mut self.record
    }

    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    pub fn can_fire(&self) -> bool {
        self.can_fire
    }
}

impl<G, SYNC, DAT, CLK> FlashTrigger for GateDriver<G, SYNC, DAT, CLK>
where
    G: OutputPin,
    SYNC: InputPin,
    DAT: InputPin,
    CLK: InputPin,
{
    fn start(&mut self) {
        self.gates.set_high().ok();
    }

    fn stop(&mut self) {
        self.gates.set_low().ok();
    }

    fn set_can_fire(&mut self, ready: bool) {
        self.can_fire = ready;
    }

    fn set_manual_power(&mut self, level: i8) {
        self.mode = PowerMode::Manual(level);
    }

    fn record(&self) -> &FlashRecord {
        &self.record
    }

    fn line_levels(&mut self) -> LineLevels {
        LineLevels {
            sync: self.sync.is_high().unwrap_or(false),
            data: self.data.is_high().unwrap_or(false),
            clock: self.clock.is_high().unwrap_or(false),
        }
    }
}
