//! # SN/X Disassembler
//!
//! Decode 16-bit SN/X words back into assembly text.
//!
//! Works on plain word slices so it can read images from any source: the
//! assembler's `Image`, a hex file via [`parse_hex`], or memory dumps.
//!
//! ## Example
//!
//! ```rust
//! use snx_disassembler::{decode, format, parse_hex};
//!
//! let words = parse_hex("A405 7000").unwrap();
//! assert_eq!(format(&decode(words[0]).unwrap()), "LDA $1, 5($0)");
//! ```

pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod formatter;

pub use decoder::{decode, Decoded};
pub use disassembler::{disassemble, disassemble_file, parse_hex};
pub use error::{DisassemblerError, Result};
pub use formatter::format;
