use memchr::memchr3;

use crate::error::Error;
use crate::Result;

/// A lexical token with the 1-based position of its first byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    Colon,
    Comma,
    Bang,
    /// Raw inner text of a string literal, escapes preserved verbatim.
    Str(String),
    Name(String),
    Eof,
}

impl TokenKind {
    /// The lexeme as shown in error messages.
    pub fn lexeme(&self) -> &str {
        match self {
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Bang => "!",
            TokenKind::Str(raw) => raw,
            TokenKind::Name(name) => name,
            TokenKind::Eof => "end of input",
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn advance(&mut self) {
        let Some(ch) = self.input[self.pos..].chars().next() else {
            return;
        };
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn is_name_start(byte: u8) -> bool {
        byte == b'_' || byte.is_ascii_alphabetic()
    }

    fn is_name_char(byte: u8) -> bool {
        Self::is_name_start(byte) || byte.is_ascii_digit() || byte == b'-' || byte == b'.'
    }

    /// Scan a string literal, keeping `\X` sequences verbatim. The fixed
    /// number of bytes after `\x`/`\u`/`\U` is consumed blindly so an
    /// embedded `\"` cannot terminate the literal; the escape codec
    /// validates the digits later.
    fn scan_string(&mut self) -> Result<Token> {
        let start_line = self.line;
        let start_column = self.column;

        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            let rest = &self.input[self.pos..];
            let offset = memchr3(b'\\', b'"', b'\n', rest.as_bytes());

            let Some(offset) = offset else {
                return Err(Error::lexer("Unterminated string", start_line, start_column));
            };

            if offset > 0 {
                let chunk = &rest[..offset];
                value.push_str(chunk);
                self.pos += offset;
                self.column += chunk.chars().count();
            }

            match self.current() {
                Some(b'"') => {
                    self.advance(); // closing quote
                    return Ok(Token {
                        kind: TokenKind::Str(value),
                        line: start_line,
                        column: start_column,
                    });
                }
                Some(b'\n') => {
                    value.push('\n');
                    self.advance();
                }
                Some(b'\\') => {
                    self.advance();
                    if self.at_end() {
                        return Err(Error::lexer(
                            "Unexpected end of input in escape sequence",
                            self.line,
                            self.column,
                        ));
                    }
                    value.push('\\');
                    let selector = self.input[self.pos..]
                        .chars()
                        .next()
                        .expect("checked not at end");
                    value.push(selector);

                    let hex_len = match selector {
                        'x' => 2,
                        'u' => 4,
                        'U' => 8,
                        _ => {
                            self.advance();
                            continue;
                        }
                    };
                    self.advance();
                    for _ in 0..hex_len {
                        match self.current() {
                            None | Some(b'"') => break,
                            _ => {
                                let ch = self.input[self.pos..]
                                    .chars()
                                    .next()
                                    .expect("checked not at end");
                                value.push(ch);
                                self.advance();
                            }
                        }
                    }
                }
                _ => unreachable!("memchr3 only stops at quote, newline, or backslash"),
            }
        }
    }

    fn scan_name(&mut self) -> Token {
        let start_line = self.line;
        let start_column = self.column;
        let start = self.pos;

        while self.current().is_some_and(Self::is_name_char) {
            self.advance();
        }

        Token {
            kind: TokenKind::Name(self.input[start..self.pos].to_string()),
            line: start_line,
            column: start_column,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }

        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        let Some(byte) = self.current() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        };

        let kind = match byte {
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'!' => TokenKind::Bang,
            b'"' => return self.scan_string(),
            _ if Self::is_name_start(byte) => return Ok(self.scan_name()),
            _ => {
                let ch = self.input[self.pos..]
                    .chars()
                    .next()
                    .expect("checked not at end");
                return Err(Error::lexer(
                    format!("Unexpected character '{ch}'"),
                    line,
                    column,
                ));
            }
        };

        self.advance();
        Ok(Token { kind, line, column })
    }

    pub fn peek_token(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            let token = self.next_token()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref().expect("just filled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token.kind == TokenKind::Eof;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[rstest]
    fn test_structural_tokens() {
        assert_eq!(
            kinds("{}:,!"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    fn test_names_and_strings() {
        assert_eq!(
            kinds("key: !str \"value\""),
            vec![
                TokenKind::Name("key".to_string()),
                TokenKind::Colon,
                TokenKind::Bang,
                TokenKind::Name("str".to_string()),
                TokenKind::Str("value".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    fn test_name_charset() {
        assert_eq!(
            kinds("_list-item.v2"),
            vec![TokenKind::Name("_list-item.v2".to_string()), TokenKind::Eof]
        );
    }

    #[rstest]
    fn test_string_keeps_escapes_raw() {
        assert_eq!(
            kinds(r#""a\nb\"c""#),
            vec![TokenKind::Str(r#"a\nb\"c"#.to_string()), TokenKind::Eof]
        );
    }

    #[rstest]
    fn test_hex_escape_consumes_embedded_quote_digits() {
        // \x22 is a quote byte; the literal must not end there.
        assert_eq!(
            kinds(r#""a\x22b""#),
            vec![TokenKind::Str(r#"a\x22b"#.to_string()), TokenKind::Eof]
        );
    }

    #[rstest]
    fn test_positions() {
        let mut lexer = Lexer::new("{\n  a: !int \"1\"\n}");
        let brace = lexer.next_token().unwrap();
        assert_eq!((brace.line, brace.column), (1, 1));
        let name = lexer.next_token().unwrap();
        assert_eq!((name.line, name.column), (2, 3));
        assert_eq!(name.kind, TokenKind::Name("a".to_string()));
    }

    #[rstest]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("{}");
        assert_eq!(lexer.peek_token().unwrap().kind, TokenKind::LBrace);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LBrace);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RBrace);
    }

    #[rstest]
    fn test_unterminated_string_reports_opening_quote() {
        let mut lexer = Lexer::new("  \"abc");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.to_string(), "Unterminated string at line 1, column 3");
    }

    #[rstest]
    fn test_eof_in_escape_sequence() {
        let mut lexer = Lexer::new("\"abc\\");
        let err = lexer.next_token().unwrap_err();
        assert!(err.to_string().contains("escape sequence"));
    }

    #[rstest]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("{#}");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected character '#' at line 1, column 2"
        );
    }

    #[rstest]
    fn test_newline_inside_string_is_kept() {
        assert_eq!(
            kinds("\"a\nb\""),
            vec![TokenKind::Str("a\nb".to_string()), TokenKind::Eof]
        );
    }
}
