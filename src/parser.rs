//! Parser for the RQL wire format.
//!
//! ```text
//! root       := conjunct ('&' conjunct)*
//! conjunct   := name '(' args ')' | property '=' value | property '=' name '=' value
//! args       := (arg (',' arg)*)?
//! arg        := name '(' args ')' | '(' args ')' | value
//! ```
//!
//! Values are decoded with the same rules the encoder uses to disambiguate
//! them, so that `string:123` reads back as a string and `123` as a number.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use percent_encoding::percent_decode_str;

use crate::{
    ast::{Arg, Node, Operator, Token},
    encoder::is_date_like,
    lexer::Lexer,
    numeric::{NumberLiteral, parse_wire_number},
};

/// Errors that can occur while parsing a wire query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The token at `position` does not fit the grammar
    #[error("Expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    /// A token decodes to invalid UTF-8
    #[error("Invalid percent-encoding in {text:?} at position {position}")]
    InvalidEncoding { text: String, position: usize },
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    token_position: usize,
}

/// Parses a wire query string into a tree.
///
/// Several `&`-joined conjuncts become one `and` node, a single conjunct is
/// returned as it is, and the empty string is an empty `and`.
///
/// ```
/// use rql_engine::{Arg, Operator, parser::parse};
///
/// let node = parse("eq(name,string:123)").unwrap();
/// assert_eq!(node.name, Operator::Eq);
/// assert_eq!(node.args, vec![Arg::from("name"), Arg::from("123")]);
/// ```
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(input)).parse_query()
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let token_position = lexer.position();
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            token_position,
        }
    }

    fn advance(&mut self) {
        self.token_position = self.lexer.position();
        self.current_token = self.lexer.next_token();
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current_token) == std::mem::discriminant(token)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: describe(&self.current_token),
            position: self.token_position,
        }
    }

    fn expect(&mut self, expected: Token, description: &str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(description));
        }
        self.advance();
        Ok(())
    }

    fn expect_text(&mut self, description: &str) -> Result<(String, usize), ParseError> {
        let position = self.token_position;
        match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::Text(text) => {
                self.advance();
                Ok((text, position))
            }
            token => {
                self.current_token = token;
                Err(self.unexpected(description))
            }
        }
    }

    pub fn parse_query(&mut self) -> Result<Node, ParseError> {
        if self.check(&Token::Eof) {
            return Ok(Node::default());
        }

        let mut conjuncts = vec![self.parse_conjunct()?];
        while self.check(&Token::Ampersand) {
            self.advance();
            conjuncts.push(self.parse_conjunct()?);
        }
        self.expect(Token::Eof, "'&' or end of input")?;

        if conjuncts.len() == 1
            && let Some(node) = conjuncts.pop()
        {
            return Ok(node);
        }
        Ok(Node::and(conjuncts.into_iter().map(Arg::Node).collect()))
    }

    fn parse_conjunct(&mut self) -> Result<Node, ParseError> {
        let (text, position) = self.expect_text("an operator or property name")?;
        match self.current_token {
            Token::LParen => {
                self.advance();
                let args = self.parse_args()?;
                Ok(Node::new(decode_text(&text, position)?, args))
            }
            Token::Equals => {
                self.advance();
                let property = decode_text(&text, position)?;
                self.parse_shorthand(property)
            }
            _ => Err(self.unexpected("'(' or '='")),
        }
    }

    /// `property=value` or `property=operator=value`, after the first `=`.
    fn parse_shorthand(&mut self, property: String) -> Result<Node, ParseError> {
        if !matches!(self.current_token, Token::Text(_)) {
            let value = self.parse_arg()?;
            return Ok(Node::new(Operator::Eq, vec![Arg::String(property), value]));
        }

        let (text, position) = self.expect_text("a value")?;
        match self.current_token {
            Token::Equals => {
                self.advance();
                let value = self.parse_arg()?;
                Ok(Node::new(
                    decode_text(&text, position)?,
                    vec![Arg::String(property), value],
                ))
            }
            Token::LParen => {
                self.advance();
                let args = self.parse_args()?;
                let value = Arg::Node(Node::new(decode_text(&text, position)?, args));
                Ok(Node::new(Operator::Eq, vec![Arg::String(property), value]))
            }
            _ => {
                let value = decode_value_at(&text, position)?;
                Ok(Node::new(Operator::Eq, vec![Arg::String(property), value]))
            }
        }
    }

    /// Arguments after an opening parenthesis, up to and including the
    /// closing one.
    fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();
        if self.check(&Token::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_arg()?);
            match self.current_token {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        let position = self.token_position;
        match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::Text(text) => {
                self.advance();
                if self.check(&Token::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    return Ok(Arg::Node(Node::new(decode_text(&text, position)?, args)));
                }
                decode_value_at(&text, position)
            }
            Token::LParen => {
                self.advance();
                Ok(Arg::Array(self.parse_args()?))
            }
            // an empty argument, as in `eq(name,)`
            token @ (Token::Comma | Token::RParen) => {
                self.current_token = token;
                Ok(Arg::String(String::new()))
            }
            token => {
                self.current_token = token;
                Err(self.unexpected("a value"))
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Text(text) => format!("'{text}'"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Ampersand => "'&'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Eof => "end of input".to_string(),
    }
}

fn decode_text(text: &str, position: usize) -> Result<String, ParseError> {
    percent_decode_str(text)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ParseError::InvalidEncoding {
            text: text.to_string(),
            position,
        })
}

/// Decodes one value token.
///
/// ```
/// use rql_engine::{Arg, parser::decode_value};
///
/// assert_eq!(decode_value("string:true").unwrap(), Arg::from("true"));
/// assert_eq!(decode_value("true").unwrap(), Arg::Boolean(true));
/// assert_eq!(decode_value("1_000L").unwrap(), Arg::Integer(1000));
/// assert_eq!(decode_value("hello%20world").unwrap(), Arg::from("hello world"));
/// ```
pub fn decode_value(text: &str) -> Result<Arg, ParseError> {
    decode_value_at(text, 0)
}

fn decode_value_at(text: &str, position: usize) -> Result<Arg, ParseError> {
    if let Some(rest) = text.strip_prefix("string:") {
        return decode_text(rest, position).map(Arg::String);
    }

    let decoded = decode_text(text, position)?;
    let value = match decoded.as_str() {
        "true" => Arg::Boolean(true),
        "false" => Arg::Boolean(false),
        "null" => Arg::Null,
        "Infinity" => Arg::Float(f64::INFINITY),
        "-Infinity" => Arg::Float(f64::NEG_INFINITY),
        _ => match parse_wire_number(&decoded) {
            Some(NumberLiteral::Integer(n)) => Arg::Integer(n),
            Some(NumberLiteral::Float(n)) => Arg::Float(n),
            None => match parse_date(&decoded) {
                Some(date) => Arg::Date(date),
                None => Arg::String(decoded),
            },
        },
    };
    Ok(value)
}

/// An RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if !is_date_like(text) {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|d| d.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}
