//! Supervisor firmware for the high-voltage charger of a capacitor-fed flash
//! tube.
//!
//! The control core is hardware independent and runs on the host for tests;
//! the ATmega128 bindings are only built for AVR targets.

#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod bootloader;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod logger;
pub mod os;
pub mod regulator;
pub mod rtos;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use application::{ControlState, Supervisor};
pub use error::Error;
