#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use panic_halt as _;

use avr_device::atmega128a::Peripherals;
use flash_hv_firmware::hal::board::Atmega128;
use flash_hv_firmware::os::TickCounter;
use flash_hv_firmware::telemetry::Telemetry;
use flash_hv_firmware::Supervisor;

static TICKS: TickCounter = TickCounter::new();
static TELEMETRY: Telemetry = Telemetry::new();

#[avr_device::interrupt(atmega128a)]
fn TIMER0_COMP() {
    TICKS.increment();
}

#[avr_device::entry]
fn main() -> ! {
    let Some(dp) = Peripherals::take() else {
        panic!()
    };

    let (hw, _tick) = Atmega128::take(dp);

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    Supervisor::new(hw, &TELEMETRY, &TICKS).run()
}
