use rover_firmata::protocol::{self, PinMode};

fn dump(label: &str, frame: [u8; 3]) {
    println!(
        "  {label:<28} {:02X} {:02X} {:02X}",
        frame[0], frame[1], frame[2]
    );
}

fn main() {
    println!("Pin mode assignment:");
    dump("ENA (pin 11) -> pwm", protocol::set_pin_mode(11, PinMode::Pwm));
    dump("IN1 (pin 13) -> output", protocol::set_pin_mode(13, PinMode::Output));

    println!("\nDigital port writes (port 1):");
    dump("pin 13 high (mask 0x20)", protocol::digital_message(1, 0x20));
    dump("pins 13+12 high (mask 0x30)", protocol::digital_message(1, 0x30));
    dump("all released (mask 0x00)", protocol::digital_message(1, 0x00));

    println!("\nAnalog writes to pin 11:");
    for duty in [0.0, 0.05, 0.3, 0.5, 1.0] {
        let level = protocol::duty_to_level(duty);
        dump(
            &format!("duty {duty:.2} -> level {level}"),
            protocol::analog_message(11, level),
        );
    }
}
