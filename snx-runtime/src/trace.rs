//! Execution trace table
//!
//! Markdown-style rows, one per executed step. Registers that were never
//! written show `*` instead of their (zero) value.

use snx_spec::Word;

pub fn format_header(reg_count: usize) -> String {
    let regs: Vec<String> = (0..reg_count).map(|i| format!("${:<2}", i)).collect();
    format!("| PC  | INST            | {} |", regs.join(" | "))
}

pub fn format_separator(reg_count: usize) -> String {
    let regs = vec!["---"; reg_count];
    format!("| --- | --------------- | {} |", regs.join(" | "))
}

/// One row: executed PC, instruction text, post-step registers
pub fn format_row(pc: u32, text: &str, registers: &[Word], written: &[bool]) -> String {
    let regs: Vec<String> = registers
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if written.get(i).copied().unwrap_or(false) {
                format!("{:<3}", value)
            } else {
                format!("{:<3}", "*")
            }
        })
        .collect();
    format!("| {:<3} | {:<15} | {} |", pc, text, regs.join(" | "))
}
