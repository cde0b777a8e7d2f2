//! Main disassembler logic

use crate::decoder::{decode, Decoded};
use crate::error::{DisassemblerError, Result};
use crate::formatter::format;
use snx_spec::Word;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Disassemble a word image into an address-prefixed listing
///
/// Each line is `AAAA:  WWWW  text`. Words with an unassigned opcode are
/// listed as `.word` and do not stop the listing.
pub fn disassemble(words: &[Word]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "; SN/X disassembly, {} word(s)", words.len());

    for (addr, &word) in words.iter().enumerate() {
        let _ = write!(output, "{:04X}:  {:04X}  ", addr, word);
        match decode(word) {
            Ok(decoded @ Decoded::Bal { target, .. }) => {
                let _ = write!(output, "{:<20}; label form -> {}", format(&decoded), target);
            }
            Ok(decoded) => output.push_str(&format(&decoded)),
            Err(e) => {
                let _ = write!(output, "{:<20}; {}", format!(".word 0x{:04X}", word), e);
            }
        }
        output.push('\n');
    }
    output
}

/// Read the hex image format: whitespace-separated words of one to four
/// hex digits. Text after `;` on a line is ignored.
pub fn parse_hex(text: &str) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let content = line.split(';').next().unwrap_or("");
        for token in content.split_whitespace() {
            let valid = token.len() <= 4 && token.chars().all(|c| c.is_ascii_hexdigit());
            let word = if valid {
                Word::from_str_radix(token, 16).ok()
            } else {
                None
            };
            match word {
                Some(w) => words.push(w),
                None => {
                    return Err(DisassemblerError::InvalidHex {
                        line: i + 1,
                        token: token.to_string(),
                    })
                }
            }
        }
    }
    Ok(words)
}

/// Read a hex image file and render its listing
pub fn disassemble_file(path: impl AsRef<Path>) -> Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(disassemble(&parse_hex(&text)?))
}
