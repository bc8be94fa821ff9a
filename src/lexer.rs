use crate::ast::{Literal, Token};

/// Single-character symbols that never start a longer token.
const STRUCTURAL: &[char] = &['[', ']', ',', '{', '}', ':', '.', '(', ')', '?', ';'];

/// Operator tokens, matched longest first.
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "&&", "||", "+", "-", "!", "*", "/", "%", "=", ">",
    "<", "|",
];

/// Errors raised while scanning source text.
///
/// Scanning stops at the first error; no partial token list is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Invalid exponent in number literal at position {position}")]
    InvalidExponent { position: usize },

    #[error("Invalid number literal '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid escape sequence '\\{ch}' at position {position}")]
    InvalidEscape { ch: char, position: usize },

    #[error("Invalid unicode escape '\\u{digits}' at position {position}")]
    InvalidUnicodeEscape { digits: String, position: usize },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

/// Scans `text` into its full token sequence.
///
/// # Examples
///
/// ```
/// use parsley::lexer::lex;
///
/// let tokens = lex("a.b | limitTo:2").unwrap();
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["a", ".", "b", "|", "limitTo", ":", "2"]);
/// ```
pub fn lex(text: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                self.advance();
            } else {
                break;
            }
        }
        Token::identifier(self.slice(start), start)
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(Token::constant(
                        self.slice(start),
                        Literal::String(result),
                        start,
                    ));
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or(LexError::UnterminatedString { position: start })?;
                    match escaped {
                        'n' => result.push('\n'),
                        'f' => result.push('\u{000C}'),
                        'r' => result.push('\r'),
                        't' => result.push('\t'),
                        'v' => result.push('\u{000B}'),
                        '\'' | '"' | '\\' => result.push(escaped),
                        'u' => {
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        other => {
                            return Err(LexError::InvalidEscape {
                                ch: other,
                                position: escape_at,
                            });
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Reads the four hex digits after `\u`; the cursor sits on the `u`.
    /// A high surrogate must be followed by a `\u` low surrogate, and the
    /// pair decodes to one character.
    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char, LexError> {
        let digits = self.hex_digits(1);
        let invalid = |digits: &str| LexError::InvalidUnicodeEscape {
            digits: digits.to_string(),
            position: escape_at,
        };
        let code = parse_hex(&digits).ok_or_else(|| invalid(&digits))?;

        let (code, consumed) = if (0xD800..=0xDBFF).contains(&code) {
            let low = match (self.peek_char(5), self.peek_char(6)) {
                (Some('\\'), Some('u')) => parse_hex(&self.hex_digits(7)),
                _ => None,
            };
            match low {
                Some(low @ 0xDC00..=0xDFFF) => {
                    (0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00), 11)
                }
                _ => return Err(invalid(&digits)),
            }
        } else {
            (code, 5)
        };

        let ch = char::from_u32(code).ok_or_else(|| invalid(&digits))?;
        self.position += consumed;
        Ok(ch)
    }

    /// Up to four characters starting `offset` past the cursor.
    fn hex_digits(&self, offset: usize) -> String {
        (offset..offset + 4)
            .filter_map(|at| self.peek_char(at))
            .collect()
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut is_float = false;
        let mut seen_dot = false;
        let mut seen_exponent = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !seen_dot && !seen_exponent {
                seen_dot = true;
                is_float = true;
                self.advance();
            } else if (ch == 'e' || ch == 'E') && !seen_exponent {
                let sign_then_digit = matches!(self.peek_char(1), Some('+' | '-'))
                    && self.peek_char(2).is_some_and(|c| c.is_ascii_digit());
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                } else if sign_then_digit {
                    self.advance();
                    self.advance();
                } else {
                    return Err(LexError::InvalidExponent {
                        position: self.position,
                    });
                }
                seen_exponent = true;
                is_float = true;
            } else {
                break;
            }
        }

        let text = self.slice(start);
        let invalid = || LexError::InvalidNumber {
            text: text.clone(),
            position: start,
        };

        let value = if is_float {
            let normalized = if text.starts_with('.') {
                format!("0{text}")
            } else {
                text.clone()
            };
            Literal::Float(normalized.parse::<f64>().map_err(|_| invalid())?)
        } else {
            match text.parse::<i64>() {
                Ok(n) => Literal::Integer(n),
                // too large for i64, keep the magnitude as a float
                Err(_) => Literal::Float(text.parse::<f64>().map_err(|_| invalid())?),
            }
        };

        Ok(Token::constant(text.clone(), value, start))
    }

    fn read_operator(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        for width in (1..=3).rev() {
            let candidate: String = (0..width).filter_map(|i| self.peek_char(i)).collect();
            if candidate.chars().count() == width && OPERATORS.contains(&candidate.as_str()) {
                self.position += width;
                return Ok(Token::symbol(candidate, start));
            }
        }
        Err(LexError::UnexpectedCharacter {
            ch: self.current_char().unwrap_or('\0'),
            position: start,
        })
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let token = match ch {
            c if c.is_ascii_digit() => self.read_number()?,
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number()?,
            '\'' | '"' => self.read_string(ch)?,
            c if STRUCTURAL.contains(&c) => {
                let start = self.position;
                self.advance();
                Token::symbol(c.to_string(), start)
            }
            c if is_identifier_start(c) => self.read_identifier(),
            _ => self.read_operator()?,
        };

        Ok(Some(token))
    }
}

/// Value of exactly four hex digits.
fn parse_hex(digits: &str) -> Option<u32> {
    if digits.chars().count() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TokenKind;

    fn texts(source: &str) -> Vec<String> {
        lex(source).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(texts("a===b"), ["a", "===", "b"]);
        assert_eq!(texts("a!==b"), ["a", "!==", "b"]);
        assert_eq!(texts("a==b"), ["a", "==", "b"]);
        assert_eq!(texts("!a"), ["!", "a"]);
        assert_eq!(texts("a||b|c"), ["a", "||", "b", "|", "c"]);
    }

    #[test]
    fn test_keywords_are_identifiers() {
        for source in ["true", "false", "null", "this"] {
            let tokens = lex(source).unwrap();
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].kind, TokenKind::Identifier);
        }
    }

    #[test]
    fn test_dollar_identifier() {
        let tokens = lex("{$: 1}").unwrap();
        assert!(tokens[1].is_identifier());
        assert_eq!(tokens[1].text, "$");
    }

    #[test]
    fn test_single_ampersand_is_rejected() {
        assert_eq!(
            lex("a & b"),
            Err(LexError::UnexpectedCharacter { ch: '&', position: 2 })
        );
    }
}
