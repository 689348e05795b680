//! Compile-time configuration for the HV flash supervisor

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate of the diagnostic console
pub const UART_BAUD: u32 = 9600;

/// Period of the system tick interrupt in milliseconds
pub const TICK_PERIOD_MS: u16 = 10;

/// Watchdog timeout period in milliseconds
pub const WDT_TIMEOUT_MS: u16 = 1000;

/// Requested ADC sample rate in Hz (10 µs per conversion)
pub const ADC_RATE_HZ: u32 = 100_000;

/// Fixed ADC reference in millivolts. `None` falls back to the value the
/// ADC driver reports, clamped to [`ADC_REF_MIN_MV`, `ADC_REF_MAX_MV`].
pub const ADC_REF_OVERRIDE_MV: Option<u16> = None;

/// Reference used when the driver reports none
pub const ADC_REF_DEFAULT_MV: u16 = 1190;

/// Lowest plausible factory calibration value
pub const ADC_REF_MIN_MV: u16 = 1000;

/// Highest plausible factory calibration value
pub const ADC_REF_MAX_MV: u16 = 1300;

/// HV rail target in volts
pub const HV_TARGET_V: u16 = 300;

/// Half width of the regulation dead band in volts
pub const HV_HYSTERESIS_V: u16 = 5;

/// Lowest HV rail voltage the flash may fire at. 250 V is the tube minimum,
/// double flashes are only stable from 280 V.
pub const HV_MIN_FIRE_V: u16 = 280;

/// Supply voltage below which charging is disabled, in millivolts
pub const SUPPLY_CUTOFF_MV: u16 = 3200;

/// Supply estimate before the first valid sample, in millivolts
pub const SUPPLY_INITIAL_MV: u16 = 4000;

/// Upper leg of the HV sense divider (680k + 470k)
pub const HV_DIVIDER_HIGH_OHMS: u32 = 1_150_000;

/// Lower leg of the HV sense divider (6k8 + 4k7)
pub const HV_DIVIDER_LOW_OHMS: u32 = 11_500;

/// Offset of the HV sense pin in millivolts
pub const HV_BIAS_MV: u16 = 0;

/// Settle delay at the end of the shutdown sequence
pub const SHUTDOWN_SETTLE_MS: u16 = 50;

/// Settle delay after toggling the interlock
pub const INTERLOCK_SETTLE_MS: u16 = 1;

/// Test-fire: first pulse width
pub const TEST_FIRE_FIRST_US: u16 = 30;

/// Test-fire: gap between the pulses
pub const TEST_FIRE_GAP_MS: u16 = 20;

/// Test-fire: second pulse width
pub const TEST_FIRE_SECOND_US: u16 = 100;

/// Highest manual power level (GN6 full power)
pub const FLASH_LEVEL_FULL: i8 = 8;

/// Manual power level before the first increment
pub const MANUAL_POWER_START: i8 = -15;

/// Manual power level after wrapping past full
pub const MANUAL_POWER_WRAP: i8 = -12;

/// Tick bit driving the "charging" blink of the indicator (~160 ms half period)
pub const INDICATOR_BLINK_MASK: u16 = 0x10;

/// Console trace verbosity, 0 disables it
pub const DEBUG_LEVEL: u8 = if cfg!(feature = "debug") { 2 } else { 1 };
