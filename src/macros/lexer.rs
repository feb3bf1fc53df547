//! C tokenizer for macro bodies.
//!
//! Single pass over the raw definition text, byte offsets kept so the
//! parser can check token adjacency (function-like detection). Line and
//! block comments are skipped; escaped newlines were already spliced by the
//! front-end.

use crate::c_ast::SourceLoc;
use crate::error::TranslationError;

/// A token of a macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroToken {
    pub kind: MacroTokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MacroTokenKind {
    Identifier(String),
    /// Raw text, suffixes included.
    IntLiteral(String),
    FloatLiteral(String),
    /// Body without quotes, escapes unresolved. `wide` for `L"..."`.
    StringLiteral { body: String, wide: bool },
    CharLiteral { body: String, wide: bool },

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Question,
    Dot,
    Arrow,
    Ellipsis,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    Assign,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    BangEq,
    Shl,
    Shr,
    Hash,
    HashHash,
    Eof,
}

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    loc: Option<&'a SourceLoc>,
}

/// Tokenize one macro definition (name included) to end of text.
pub fn tokenize(
    source: &str,
    loc: Option<&SourceLoc>,
) -> Result<Vec<MacroToken>, TranslationError> {
    let mut lexer = Lexer {
        src: source.as_bytes(),
        pos: 0,
        loc,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == MacroTokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl<'a> Lexer<'a> {
    fn error(&self, reason: &str) -> TranslationError {
        TranslationError::unsupported(
            format!("macro tokenizer: {}", reason),
            self.loc.cloned(),
        )
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_trivia(&mut self) -> Result<(), TranslationError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => return Err(self.error("unterminated block comment")),
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<MacroToken, TranslationError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Ok(MacroToken {
                kind: MacroTokenKind::Eof,
                start,
                end: start,
            });
        };

        let kind = match c {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
                {
                    self.pos += 1;
                }
                let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
                // Wide/unicode string and char prefixes.
                match self.peek() {
                    Some(b'"') if matches!(text, "L" | "u" | "U" | "u8") => {
                        let body = self.read_quoted(b'"')?;
                        MacroTokenKind::StringLiteral {
                            body,
                            wide: text != "u8",
                        }
                    }
                    Some(b'\'') if matches!(text, "L" | "u" | "U") => {
                        let body = self.read_quoted(b'\'')?;
                        MacroTokenKind::CharLiteral { body, wide: true }
                    }
                    _ => MacroTokenKind::Identifier(text.to_string()),
                }
            }
            b'0'..=b'9' => self.read_number(start)?,
            b'.' => {
                if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.read_number(start)?
                } else if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.pos += 2;
                    MacroTokenKind::Ellipsis
                } else {
                    MacroTokenKind::Dot
                }
            }
            b'"' => {
                let body = self.read_quoted_tail(b'"')?;
                MacroTokenKind::StringLiteral { body, wide: false }
            }
            b'\'' => {
                let body = self.read_quoted_tail(b'\'')?;
                MacroTokenKind::CharLiteral { body, wide: false }
            }
            b'(' => MacroTokenKind::LParen,
            b')' => MacroTokenKind::RParen,
            b'[' => MacroTokenKind::LBracket,
            b']' => MacroTokenKind::RBracket,
            b'{' => MacroTokenKind::LBrace,
            b'}' => MacroTokenKind::RBrace,
            b',' => MacroTokenKind::Comma,
            b':' => MacroTokenKind::Colon,
            b';' => MacroTokenKind::Semicolon,
            b'?' => MacroTokenKind::Question,
            b'~' => MacroTokenKind::Tilde,
            b'^' => MacroTokenKind::Caret,
            b'+' => {
                if self.peek() == Some(b'+') {
                    self.pos += 1;
                    MacroTokenKind::PlusPlus
                } else {
                    MacroTokenKind::Plus
                }
            }
            b'-' => match self.peek() {
                Some(b'-') => {
                    self.pos += 1;
                    MacroTokenKind::MinusMinus
                }
                Some(b'>') => {
                    self.pos += 1;
                    MacroTokenKind::Arrow
                }
                _ => MacroTokenKind::Minus,
            },
            b'*' => MacroTokenKind::Star,
            b'/' => MacroTokenKind::Slash,
            b'%' => MacroTokenKind::Percent,
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.pos += 1;
                    MacroTokenKind::AmpAmp
                } else {
                    MacroTokenKind::Amp
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.pos += 1;
                    MacroTokenKind::PipePipe
                } else {
                    MacroTokenKind::Pipe
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    MacroTokenKind::BangEq
                } else {
                    MacroTokenKind::Bang
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    MacroTokenKind::EqEq
                } else {
                    MacroTokenKind::Assign
                }
            }
            b'<' => match self.peek() {
                Some(b'<') => {
                    self.pos += 1;
                    MacroTokenKind::Shl
                }
                Some(b'=') => {
                    self.pos += 1;
                    MacroTokenKind::Le
                }
                _ => MacroTokenKind::Lt,
            },
            b'>' => match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    MacroTokenKind::Shr
                }
                Some(b'=') => {
                    self.pos += 1;
                    MacroTokenKind::Ge
                }
                _ => MacroTokenKind::Gt,
            },
            b'#' => {
                if self.peek() == Some(b'#') {
                    self.pos += 1;
                    MacroTokenKind::HashHash
                } else {
                    MacroTokenKind::Hash
                }
            }
            other => return Err(self.error(&format!("unexpected character '{}'", other as char))),
        };

        Ok(MacroToken {
            kind,
            start,
            end: self.pos,
        })
    }

    /// Read a quoted body with the opening quote still pending.
    fn read_quoted(&mut self, quote: u8) -> Result<String, TranslationError> {
        debug_assert_eq!(self.peek(), Some(quote));
        self.pos += 1;
        self.read_quoted_tail(quote)
    }

    /// Read a quoted body with the opening quote already consumed.
    fn read_quoted_tail(&mut self, quote: u8) -> Result<String, TranslationError> {
        let mut body = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated literal")),
                Some(b) if b == quote => return Ok(body),
                Some(b'\\') => {
                    body.push('\\');
                    match self.bump() {
                        None => return Err(self.error("trailing backslash")),
                        Some(b) => body.push(b as char),
                    }
                }
                Some(b) => body.push(b as char),
            }
        }
    }

    /// A C pp-number: digits, hex digits, dots and exponents, then any
    /// suffix letters. Classified float on dots or decimal/binary exponents.
    fn read_number(&mut self, start: usize) -> Result<MacroTokenKind, TranslationError> {
        let hex = self.src[start] == b'0'
            && matches!(self.peek(), Some(b'x') | Some(b'X'));
        if hex {
            self.pos += 1;
        }
        let mut is_float = self.src[start] == b'.';
        loop {
            match self.peek() {
                Some(b'.') => {
                    is_float = true;
                    self.pos += 1;
                }
                Some(b'e') | Some(b'E') if !hex => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                        self.pos += 1;
                    }
                }
                Some(b'p') | Some(b'P') if hex => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                        self.pos += 1;
                    }
                }
                Some(b) if b.is_ascii_alphanumeric() => self.pos += 1,
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| self.error("non-utf8 number"))?
            .to_string();
        Ok(if is_float {
            MacroTokenKind::FloatLiteral(text)
        } else {
            MacroTokenKind::IntLiteral(text)
        })
    }
}
