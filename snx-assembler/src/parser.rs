//! Assembly parser
//!
//! Line-oriented grammar:
//!
//! ```text
//! line     := [label ':'] [mnemonic [operand {',' operand}]]
//! operand  := register | number ['(' register ')'] | identifier
//! register := '$' digits
//! ```
//!
//! A syntax error stops parsing of its line only. At most one syntax error
//! is reported per line, and none when the lexer already rejected the line.

use crate::ast::{InstructionNode, LabelDef, Line, Operand, OperandKind, SourceProgram};
use crate::lexer::{tokenize, LexedLine, Token};
use snx_spec::{Code, Diagnostics, SourceSpan};

struct SyntaxError {
    code: Code,
    message: String,
    span: SourceSpan,
}

impl SyntaxError {
    fn new(code: Code, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    fn unexpected(token: &Token, span: SourceSpan) -> Self {
        Self::new(
            Code::P001,
            format!("unexpected token {}", describe(token)),
            span,
        )
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Identifier(name) => format!("'{}'", name),
        Token::Register(digits) => format!("'${}'", digits),
        Token::Dollar => "'$'".to_string(),
        Token::Number(text) => format!("'{}'", text),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

struct Cursor<'a> {
    line: &'a LexedLine,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a LexedLine) -> Self {
        Self { line, pos: 0 }
    }

    fn peek(&self) -> Option<&'a (Token, SourceSpan)> {
        self.line.tokens.get(self.pos)
    }

    fn peek_token(&self, offset: usize) -> Option<&'a Token> {
        self.line.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<&'a (Token, SourceSpan)> {
        let item = self.line.tokens.get(self.pos);
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.line.tokens.len()
    }

    /// Zero-width span just past the last character of the line
    fn end_span(&self) -> SourceSpan {
        let col = self.line.text.len() as u32 + 1;
        SourceSpan::new(self.line.number, col, col)
    }
}

/// Parse a whole source buffer
pub fn parse(source: &str, diagnostics: &mut Diagnostics) -> SourceProgram {
    let lexed = tokenize(source, diagnostics);
    SourceProgram {
        lines: lexed.iter().map(|line| parse_line(line, diagnostics)).collect(),
    }
}

/// Parse one tokenized line
pub fn parse_line(lexed: &LexedLine, diagnostics: &mut Diagnostics) -> Line {
    let mut cursor = Cursor::new(lexed);

    let mut label = None;
    if let (Some(Token::Identifier(_)), Some(Token::Colon)) =
        (cursor.peek_token(0), cursor.peek_token(1))
    {
        if let (Some((Token::Identifier(name), name_span)), Some((_, colon_span))) =
            (cursor.next(), cursor.next())
        {
            label = Some(LabelDef {
                name: name.clone(),
                span: name_span.to(*colon_span),
            });
        }
    }

    let mut instruction = None;
    let mut error = None;
    match cursor.next() {
        None => {}
        Some((Token::Identifier(mnemonic), span)) => {
            let mut operands = Vec::new();
            let result = parse_operands(&mut cursor, &mut operands);

            let mut text = mnemonic.clone();
            if !operands.is_empty() {
                text.push(' ');
                text.push_str(
                    &operands
                        .iter()
                        .map(|op| op.text.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }
            let end = operands.last().map_or(*span, |op| op.span);

            instruction = Some(InstructionNode {
                mnemonic: mnemonic.clone(),
                operands,
                text,
                span: span.to(end),
                malformed: result.is_err() || lexed.had_errors,
            });
            error = result.err();
        }
        Some((token, span)) => error = Some(SyntaxError::unexpected(token, *span)),
    }

    if let Some(err) = error {
        if !lexed.had_errors {
            diagnostics.report_at(err.code, err.message, err.span);
        }
    }

    Line {
        number: lexed.number,
        label,
        instruction,
        source: lexed.text.clone(),
    }
}

fn parse_operands(cursor: &mut Cursor<'_>, operands: &mut Vec<Operand>) -> Result<(), SyntaxError> {
    if cursor.is_at_end() {
        return Ok(());
    }
    loop {
        operands.push(parse_operand(cursor)?);
        match cursor.next() {
            None => return Ok(()),
            Some((Token::Comma, _)) => continue,
            Some((token, span)) => return Err(SyntaxError::unexpected(token, *span)),
        }
    }
}

fn parse_operand(cursor: &mut Cursor<'_>) -> Result<Operand, SyntaxError> {
    let end = cursor.end_span();
    match cursor.next() {
        None => Err(SyntaxError::new(Code::P001, "operand expected", end)),
        Some((Token::Register(digits), span)) => Ok(Operand {
            kind: OperandKind::Register(parse_register_index(digits, *span)?),
            text: format!("${}", digits),
            span: *span,
        }),
        Some((Token::Number(literal), span)) => {
            let offset = parse_number(literal, *span)?;
            if !matches!(cursor.peek(), Some((Token::LParen, _))) {
                return Ok(Operand {
                    kind: OperandKind::Address { offset, base: 0 },
                    text: literal.clone(),
                    span: *span,
                });
            }
            cursor.next();

            let (digits, base_span) = match cursor.next() {
                Some((Token::Register(digits), s)) => (digits, *s),
                Some((_, s)) => {
                    return Err(SyntaxError::new(
                        Code::P002,
                        "base register expected inside '( )'",
                        *s,
                    ))
                }
                None => {
                    return Err(SyntaxError::new(
                        Code::P002,
                        "base register expected inside '( )'",
                        end,
                    ))
                }
            };
            let base = parse_register_index(digits, base_span)?;

            let close = match cursor.next() {
                Some((Token::RParen, s)) => *s,
                Some((_, s)) => return Err(SyntaxError::new(Code::P002, "')' expected", *s)),
                None => return Err(SyntaxError::new(Code::P002, "')' expected", end)),
            };

            Ok(Operand {
                kind: OperandKind::Address { offset, base },
                text: format!("{}(${})", literal, digits),
                span: span.to(close),
            })
        }
        Some((Token::Identifier(name), span)) => Ok(Operand {
            kind: OperandKind::Label(name.clone()),
            text: name.clone(),
            span: *span,
        }),
        Some((Token::LParen, span)) => Err(SyntaxError::new(
            Code::P002,
            "address offset expected before '('",
            *span,
        )),
        Some((token, span)) => Err(SyntaxError::unexpected(token, *span)),
    }
}

fn parse_register_index(digits: &str, span: SourceSpan) -> Result<u32, SyntaxError> {
    digits.parse::<u32>().map_err(|_| {
        SyntaxError::new(
            Code::P003,
            format!("register number ${} out of range", digits),
            span,
        )
    })
}

fn parse_number(literal: &str, span: SourceSpan) -> Result<i32, SyntaxError> {
    literal.parse::<i32>().map_err(|_| {
        SyntaxError::new(Code::P003, format!("number {} out of range", literal), span)
    })
}
