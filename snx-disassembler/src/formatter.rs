//! Decoded words to assembly text

use crate::decoder::Decoded;

/// Render a decoded word as assembly text
///
/// BZ targets print as the absolute PC. BAL prints its address reading;
/// the listing adds the label reading as a comment.
pub fn format(decoded: &Decoded) -> String {
    match *decoded {
        Decoded::R {
            op,
            dest,
            src1,
            src2,
        } => format!(
            "{} {}, {}, {}",
            op,
            format_reg(dest),
            format_reg(src1),
            format_reg(src2)
        ),
        Decoded::R1 { op, dest, src } => {
            format!("{} {}, {}", op, format_reg(dest), format_reg(src))
        }
        Decoded::Halt => "HLT".to_string(),
        Decoded::Memory { op, reg, base, imm } => {
            format!("{} {}, {}", op, format_reg(reg), format_address(imm, base))
        }
        Decoded::Io { op, reg } => format!("{} {}", op, format_reg(reg)),
        Decoded::Bz { cond, target } => format!("BZ {}, {}", format_reg(cond), target),
        Decoded::Bal {
            link, base, imm, ..
        } => format!("BAL {}, {}", format_reg(link), format_address(imm, base)),
    }
}

/// `$n`
pub fn format_reg(index: u8) -> String {
    format!("${}", index)
}

/// `imm($b)`
pub fn format_address(imm: i8, base: u8) -> String {
    format!("{}({})", imm, format_reg(base))
}
