use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds only carry the control core and its tests
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega128
    println!("cargo:rustc-link-arg=-mmcu=atmega128");

    if env::var("CARGO_FEATURE_FIRMWARE").is_err() {
        println!("cargo:warning=AVR target without the `firmware` feature builds the library only");
    }
}
