//! # Lexer for SN/X Assembly Language

use logos::Logos;
use snx_spec::{Code, Diagnostics, SourceSpan};

/// Tokens for SN/X assembly
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip whitespace
#[logos(skip r"[;#][^\n]*")] // Skip comments
pub enum Token {
    /// Identifier (mnemonics, labels)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Register: `$` followed by its decimal index (digits kept as text)
    #[regex(r"\$[0-9]+", |lex| lex.slice()[1..].to_string())]
    Register(String),

    /// `$` with no index after it
    #[token("$")]
    Dollar,

    /// Signed decimal number (kept as text, range-checked by the parser)
    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().to_string())]
    Number(String),

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Tokens of one source line
#[derive(Debug, Clone, PartialEq)]
pub struct LexedLine {
    /// 1-based line number
    pub number: u32,
    pub text: String,
    pub tokens: Vec<(Token, SourceSpan)>,
    /// The lexer reported an error on this line
    pub had_errors: bool,
}

/// Split `source` into lines and tokenize each, reporting L001/L002
pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> Vec<LexedLine> {
    source
        .lines()
        .enumerate()
        .map(|(i, text)| tokenize_line(i as u32 + 1, text, diagnostics))
        .collect()
}

fn tokenize_line(number: u32, text: &str, diagnostics: &mut Diagnostics) -> LexedLine {
    let mut tokens = Vec::new();
    let mut had_errors = false;

    for (token, range) in Token::lexer(text).spanned() {
        let span = SourceSpan::new(number, range.start as u32 + 1, range.end as u32 + 1);
        match token {
            Ok(Token::Dollar) => {
                had_errors = true;
                diagnostics.report_at(Code::L002, "register number expected after '$'", span);
            }
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                had_errors = true;
                let bad = text.get(range).unwrap_or("?");
                diagnostics.report_at(Code::L001, format!("invalid character '{}'", bad), span);
            }
        }
    }

    LexedLine {
        number,
        text: text.to_string(),
        tokens,
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        Token::lexer(text).filter_map(|t| t.ok()).collect()
    }

    #[test]
    fn test_lexer_registers() {
        let mut lex = Token::lexer("$0 $3 $12");
        assert_eq!(lex.next(), Some(Ok(Token::Register("0".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Register("3".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Register("12".to_string()))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_numbers() {
        let mut lex = Token::lexer("42 -10 +7");
        assert_eq!(lex.next(), Some(Ok(Token::Number("42".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number("-10".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number("+7".to_string()))));
    }

    #[test]
    fn test_lexer_instruction_line() {
        assert_eq!(
            kinds("main: LD $1, -2($3) ; load"),
            vec![
                Token::Identifier("main".to_string()),
                Token::Colon,
                Token::Identifier("LD".to_string()),
                Token::Register("1".to_string()),
                Token::Comma,
                Token::Number("-2".to_string()),
                Token::LParen,
                Token::Register("3".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_lexer_comments() {
        assert!(kinds("; only a comment").is_empty());
        assert!(kinds("# hash comment").is_empty());
        assert_eq!(kinds("HLT # stop"), vec![Token::Identifier("HLT".to_string())]);
    }

    #[test]
    fn test_tokenize_spans() {
        let mut diags = Diagnostics::new();
        let lines = tokenize("\n  ADD $1, $2, $3", &mut diags);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].tokens.is_empty());
        assert_eq!(lines[1].tokens[0].1, SourceSpan::new(2, 3, 6));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_tokenize_errors() {
        let mut diags = Diagnostics::new();
        let lines = tokenize("ADD $1, @, $", &mut diags);
        assert!(lines[0].had_errors);
        let codes: Vec<Code> = diags.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![Code::L001, Code::L002]);
        assert_eq!(diags.as_slice()[0].span, Some(SourceSpan::new(1, 9, 10)));
    }
}
