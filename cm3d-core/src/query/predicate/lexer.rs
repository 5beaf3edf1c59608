//! Tokenizer for filter predicates.
//!
//! Produces a flat token list terminated by [`TokenKind::Eof`]. Keywords are
//! case-insensitive. Offsets are byte positions into the predicate text.

use crate::errors::QueryError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Bare identifier
    Ident(String),
    /// `"..."` identifier, with `""` unescaped
    QuotedIdent(String),
    /// `'...'` literal, with `''` unescaped
    String(String),
    Integer(i64),
    Real(f64),

    Dot,
    Comma,
    LeftParen,
    RightParen,
    Minus,

    Eq,
    EqEq,
    Ne,
    LtGt,
    Lt,
    Le,
    Gt,
    Ge,

    KwAnd,
    KwOr,
    KwNot,
    KwIs,
    KwNull,
    KwLike,
    KwIn,
    KwBetween,
    KwTrue,
    KwFalse,

    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            src: source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(source: &str) -> Result<Vec<Token>, QueryError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token, QueryError> {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let offset = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset,
            });
        };

        let kind = match ch {
            b'\'' => TokenKind::String(self.lex_quoted(b'\'', "string literal")?),
            b'"' => TokenKind::QuotedIdent(self.lex_quoted(b'"', "quoted identifier")?),
            b'0'..=b'9' => self.lex_number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_word(),
            b'.' => self.single(TokenKind::Dot),
            b',' => self.single(TokenKind::Comma),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'-' => self.single(TokenKind::Minus),
            b'=' => {
                self.pos += 1;
                if self.eat(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                self.pos += 1;
                if !self.eat(b'=') {
                    return Err(QueryError::syntax(offset, "expected '=' after '!'"));
                }
                TokenKind::Ne
            }
            b'<' => {
                self.pos += 1;
                if self.eat(b'=') {
                    TokenKind::Le
                } else if self.eat(b'>') {
                    TokenKind::LtGt
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                self.pos += 1;
                if self.eat(b'=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            _ => {
                let found = self.src[offset..].chars().next().unwrap_or('?');
                return Err(QueryError::syntax(
                    offset,
                    format!("unexpected character '{found}'"),
                ));
            }
        };

        Ok(Token { kind, offset })
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Quoted text; a doubled quote stands for one literal quote
    fn lex_quoted(&mut self, quote: u8, what: &str) -> Result<String, QueryError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let mut chunk_start = self.pos;

        loop {
            match self.peek() {
                None => {
                    return Err(QueryError::syntax(start, format!("unterminated {what}")));
                }
                Some(c) if c == quote => {
                    value.push_str(&self.src[chunk_start..self.pos]);
                    self.pos += 1;
                    if self.peek() == Some(quote) {
                        value.push(quote as char);
                        self.pos += 1;
                        chunk_start = self.pos;
                    } else {
                        return Ok(value);
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, QueryError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        let mut is_real = false;
        if self.peek() == Some(b'.') && self.bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit) {
            is_real = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut lookahead = self.pos + 1;
            if matches!(self.bytes.get(lookahead), Some(b'+' | b'-')) {
                lookahead += 1;
            }
            if self.bytes.get(lookahead).is_some_and(u8::is_ascii_digit) {
                is_real = true;
                self.pos = lookahead;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.src[start..self.pos];
        if is_real {
            text.parse()
                .map(TokenKind::Real)
                .map_err(|_| QueryError::syntax(start, format!("invalid number '{text}'")))
        } else {
            text.parse()
                .map(TokenKind::Integer)
                .map_err(|_| QueryError::syntax(start, format!("integer '{text}' out of range")))
        }
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }

        let word = &self.src[start..self.pos];
        match word.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::KwAnd,
            "OR" => TokenKind::KwOr,
            "NOT" => TokenKind::KwNot,
            "IS" => TokenKind::KwIs,
            "NULL" => TokenKind::KwNull,
            "LIKE" => TokenKind::KwLike,
            "IN" => TokenKind::KwIn,
            "BETWEEN" => TokenKind::KwBetween,
            "TRUE" => TokenKind::KwTrue,
            "FALSE" => TokenKind::KwFalse,
            _ => TokenKind::Ident(word.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            kinds("study.title = 'T1'"),
            vec![
                TokenKind::Ident("study".to_string()),
                TokenKind::Dot,
                TokenKind::Ident("title".to_string()),
                TokenKind::Eq,
                TokenKind::String("T1".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("not Null and OR"),
            vec![
                TokenKind::KwNot,
                TokenKind::KwNull,
                TokenKind::KwAnd,
                TokenKind::KwOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<= >= <> != == < >"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::LtGt,
                TokenKind::Ne,
                TokenKind::EqEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("5 2.5 1e3"),
            vec![
                TokenKind::Integer(5),
                TokenKind::Real(2.5),
                TokenKind::Real(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            kinds("'it''s' \"data_a\"\"b\""),
            vec![
                TokenKind::String("it's".to_string()),
                TokenKind::QuotedIdent("data_a\"b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::tokenize("study.title = 'open").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { position: 14, .. }));
    }

    #[test]
    fn test_rejects_statement_separator() {
        let err = Lexer::tokenize("1 = 1; DROP TABLE studies").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { position: 5, .. }));
    }
}
