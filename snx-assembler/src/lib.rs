//! SN/X Assembler
//!
//! Text to checked IR to 16-bit image. [`compile`] runs the lexer, parser,
//! resolver and every static check and returns all diagnostics at once;
//! [`assemble`] additionally encodes a clean program.
//!
//! ## Example
//!
//! ```rust
//! use snx_assembler::assemble;
//! use snx_spec::Config;
//!
//! let source = r#"
//! main:   LDA $1, 5($0)
//!         HLT
//! "#;
//!
//! let image = assemble(source, &Config::DEFAULT).unwrap();
//! assert_eq!(image.words, vec![0xA405, 0x7000]);
//! ```

pub mod assembler;
pub mod ast;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod lower;
pub mod parser;

pub use assembler::{assemble, compile, compile_file};
pub use encoder::{encode, encode_program, Image};
pub use error::{AssemblerError, Result};
pub use lower::lower;
pub use parser::parse;
