use crate::ast::Token;

/// Splits an RQL wire string into tokens.
///
/// Structural characters are `(`, `)`, `,`, `&` and `=`; every other run of
/// characters is a single [`Token::Text`], left percent-encoded for the parser
/// to decode.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Character offset of the next token.
    pub fn position(&self) -> usize {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_structural(ch: char) -> bool {
        matches!(ch, '(' | ')' | ',' | '&' | '=')
    }

    fn read_text(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_structural(ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    pub fn next_token(&mut self) -> Token {
        let token = match self.current_char() {
            None => return Token::Eof,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,
            Some('&') => Token::Ampersand,
            Some('=') => Token::Equals,
            Some(_) => return Token::Text(self.read_text()),
        };
        self.advance();
        token
    }

    /// Collects every token up to and including [`Token::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}
