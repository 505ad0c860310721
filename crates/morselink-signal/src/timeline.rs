use morselink_core::{MorseSymbol, SignalEvent, SignalLevel};

use crate::timing::FlashTiming;

/// Expand wire-format Morse text into a flash timeline.
///
/// The first event is always an `Off` lead-in of `lead_in_units`. A dot or
/// dash turns the signal on for its span and is followed by a one-unit off
/// gap; letter and word separators extend the off time. Characters outside
/// the wire alphabet are skipped. Pure and deterministic; the whole list is
/// materialised before playback starts.
pub fn build_timeline(morse: &str, timing: &FlashTiming) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    events.push(SignalEvent::new(SignalLevel::Off, timing.ms(timing.lead_in_units)));

    for symbol in morse.chars().filter_map(MorseSymbol::from_wire) {
        match symbol {
            MorseSymbol::Dot => {
                events.push(SignalEvent::new(SignalLevel::On, timing.ms(timing.dot_units)));
                events.push(SignalEvent::new(SignalLevel::Off, timing.ms(timing.symbol_gap_units)));
            }
            MorseSymbol::Dash => {
                events.push(SignalEvent::new(SignalLevel::On, timing.ms(timing.dash_units)));
                events.push(SignalEvent::new(SignalLevel::Off, timing.ms(timing.symbol_gap_units)));
            }
            MorseSymbol::LetterGap => {
                events.push(SignalEvent::new(SignalLevel::Off, timing.ms(timing.letter_gap_units)));
            }
            MorseSymbol::WordGap => {
                events.push(SignalEvent::new(SignalLevel::Off, timing.ms(timing.word_gap_units)));
            }
        }
    }

    events
}
