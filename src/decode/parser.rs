use crate::decode::lexer::{Lexer, Token, TokenKind};
use crate::error::Error;
use crate::types::{Element, Grouping, Payload};
use crate::Result;

/// Recursive-descent parser over the token stream.
///
/// ```text
/// document := grouping EOF
/// grouping := '{' [ element (',' element)* [','] ] '}'
/// element  := NAME ':' '!' NAME value
/// value    := STRING | grouping
/// ```
///
/// Type tags are accepted as plain names here; the value codec checks them.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Parse a complete document: one outer grouping followed by EOF.
    pub fn parse(&mut self) -> Result<Grouping> {
        let grouping = self.parse_grouping()?;

        let token = self.lexer.peek_token()?;
        if token.kind != TokenKind::Eof {
            return Err(Error::parse(
                format!("Unexpected token after grouping: '{}'", token.kind.lexeme()),
                token.line,
                token.column,
            ));
        }

        Ok(grouping)
    }

    fn expect(&mut self, expected: &TokenKind, what: &str) -> Result<Token> {
        let token = self.lexer.next_token()?;
        if std::mem::discriminant(&token.kind) != std::mem::discriminant(expected) {
            return Err(Error::parse(
                format!("Expected {what}, got '{}'", token.kind.lexeme()),
                token.line,
                token.column,
            ));
        }
        Ok(token)
    }

    fn expect_name(&mut self, what: &str) -> Result<String> {
        let token = self.expect(&TokenKind::Name(String::new()), what)?;
        match token.kind {
            TokenKind::Name(name) => Ok(name),
            _ => unreachable!("expect() matched a name"),
        }
    }

    fn parse_grouping(&mut self) -> Result<Grouping> {
        self.expect(&TokenKind::LBrace, "'{'")?;

        let mut grouping = Grouping::default();

        if self.lexer.peek_token()?.kind == TokenKind::RBrace {
            self.lexer.next_token()?;
            return Ok(grouping);
        }

        grouping.elements.push(self.parse_element()?);

        while self.lexer.peek_token()?.kind == TokenKind::Comma {
            self.lexer.next_token()?;
            // Trailing comma before the closing brace is permitted.
            if self.lexer.peek_token()?.kind == TokenKind::RBrace {
                break;
            }
            grouping.elements.push(self.parse_element()?);
        }

        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(grouping)
    }

    fn parse_element(&mut self) -> Result<Element> {
        let name = self.expect_name("element name")?;
        self.expect(&TokenKind::Colon, "':'")?;
        self.expect(&TokenKind::Bang, "'!'")?;
        let type_tag = self.expect_name("type name")?;
        let payload = self.parse_payload()?;

        Ok(Element {
            name,
            type_tag,
            payload,
        })
    }

    fn parse_payload(&mut self) -> Result<Payload> {
        let token = self.lexer.peek_token()?;
        match token.kind {
            TokenKind::Str(_) => {
                let token = self.lexer.next_token()?;
                match token.kind {
                    TokenKind::Str(raw) => Ok(Payload::Text(raw)),
                    _ => unreachable!("peeked a string"),
                }
            }
            TokenKind::LBrace => Ok(Payload::Group(self.parse_grouping()?)),
            _ => Err(Error::parse(
                format!(
                    "Expected string or grouping, got '{}'",
                    token.kind.lexeme()
                ),
                token.line,
                token.column,
            )),
        }
    }
}

/// Parse `input` as a SISL document and return the outer grouping.
pub fn parse_document(input: &str) -> Result<Grouping> {
    Parser::new(input).parse()
}
