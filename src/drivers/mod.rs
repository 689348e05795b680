pub mod flash_trigger;
pub mod serial_console;

pub use flash_trigger::GateDriver;
pub use serial_console::SerialConsole;
