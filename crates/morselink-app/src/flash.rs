use std::io::Write;

use morselink_core::SignalLevel;
use morselink_signal::SignalSink;

/// Console rendition of the flash lamp: a filled block while the signal is
/// on, an empty well while it is off. `finish` clears the line so chat
/// output continues underneath.
pub struct ConsoleFlash {
    color: String,
}

impl ConsoleFlash {
    pub fn new(color: impl Into<String>) -> Self {
        Self { color: color.into() }
    }

    fn draw(&self, lamp: &str) {
        print!("\r  [{lamp}] {}", self.color);
        let _ = std::io::stdout().flush();
    }
}

impl SignalSink for ConsoleFlash {
    fn set_level(&mut self, level: SignalLevel) {
        match level {
            SignalLevel::On => self.draw("██████"),
            SignalLevel::Off => self.draw("      "),
        }
    }

    fn finish(&mut self) {
        // Wipe the lamp line.
        print!("\r{:width$}\r", "", width = 16 + self.color.len());
        let _ = std::io::stdout().flush();
    }
}
