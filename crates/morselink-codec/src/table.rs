//! Fixed character→glyph table.
//!
//! Wire format: `.` and `-` inside a glyph, one space between glyphs, `/`
//! for a word break (so `' '.join` yields `"... / ..."` around it).

/// Morse glyph for one uppercase character, if the table covers it.
pub fn morse_glyph(c: char) -> Option<&'static str> {
    let glyph = match c {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '.' => ".-.-.-",
        ',' => "--..--",
        '?' => "..--..",
        '\'' => ".----.",
        '!' => "-.-.--",
        '/' => "-..-.",
        '(' => "-.--.",
        ')' => "-.--.-",
        '&' => ".-...",
        ':' => "---...",
        ';' => "-.-.-.",
        '=' => "-...-",
        '+' => ".-.-.",
        '-' => "-....-",
        '_' => "..--.-",
        '"' => ".-..-.",
        '$' => "...-..-",
        '@' => ".--.-.",
        ' ' => "/",
        _ => return None,
    };
    Some(glyph)
}

/// Encode `text` with the fixed table.
///
/// Input is uppercased; each character becomes its glyph, spaces become the
/// `/` word separator, and anything outside the table becomes a literal `?`.
/// Glyphs are joined by single spaces. Total: never fails, empty in → empty
/// out.
pub fn encode_with_table(text: &str) -> String {
    let mut glyphs: Vec<&str> = Vec::new();
    for c in text.to_uppercase().chars() {
        glyphs.push(morse_glyph(c).unwrap_or("?"));
    }
    glyphs.join(" ")
}
