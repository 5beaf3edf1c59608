//! Predicate grammar.
//!
//! ```text
//! predicate  := predicate OR predicate
//!             | predicate AND predicate
//!             | NOT predicate
//!             | '(' predicate ')'
//!             | condition
//! condition  := operand cmp operand
//!             | operand IS [NOT] NULL
//!             | operand [NOT] LIKE operand
//!             | operand [NOT] IN '(' operand {',' operand} ')'
//!             | operand [NOT] BETWEEN operand AND operand
//! operand    := table '.' column | literal
//! literal    := 'text' | [-]number | NULL | TRUE | FALSE
//! ```
//!
//! Boolean connectives are parsed with binding powers; `AND` binds tighter
//! than `OR` and `NOT` tighter than both. A bare operand is not a predicate.
//! Nesting depth and the number of conditions are bounded; input past either
//! limit is a syntax error.

use super::lexer::{Lexer, Token, TokenKind};
use crate::errors::QueryError;

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Column { table: String, column: String },
    Literal(Literal),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    IsNull {
        operand: Operand,
        negated: bool,
    },
    Like {
        operand: Operand,
        pattern: Operand,
        negated: bool,
    },
    In {
        operand: Operand,
        list: Vec<Operand>,
        negated: bool,
    },
    Between {
        operand: Operand,
        low: Operand,
        high: Operand,
        negated: bool,
    },
}

mod bp {
    // Infix: (left, right)
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    // Prefix NOT right BP
    pub const NOT_PREFIX: u8 = 5;
}

/// Deepest allowed nesting of `NOT` and parentheses
pub const MAX_NESTING: usize = 256;
/// Most conditions one predicate may combine
pub const MAX_CONDITIONS: usize = 1024;

/// Parse a complete predicate; trailing tokens are an error
pub fn parse(source: &str) -> Result<Predicate, QueryError> {
    let tokens = Lexer::tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        conditions: 0,
    };
    let predicate = parser.parse_predicate_bp(0)?;
    match parser.peek_kind() {
        TokenKind::Eof => Ok(predicate),
        _ => Err(parser.error("unexpected input after predicate")),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    conditions: usize,
}

impl Parser {
    fn parse_predicate_bp(&mut self, min_bp: u8) -> Result<Predicate, QueryError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (l_bp, r_bp) = match self.peek_kind() {
                TokenKind::KwOr => bp::OR,
                TokenKind::KwAnd => bp::AND,
                _ => break,
            };
            if l_bp < min_bp {
                break;
            }
            let is_and = matches!(self.advance().kind, TokenKind::KwAnd);
            let rhs = self.parse_predicate_bp(r_bp)?;
            lhs = if is_and {
                Predicate::And(Box::new(lhs), Box::new(rhs))
            } else {
                Predicate::Or(Box::new(lhs), Box::new(rhs))
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Predicate, QueryError> {
        match self.peek_kind() {
            TokenKind::KwNot => {
                self.enter()?;
                self.advance();
                let inner = self.parse_predicate_bp(bp::NOT_PREFIX);
                self.depth -= 1;
                Ok(Predicate::Not(Box::new(inner?)))
            }
            TokenKind::LeftParen => {
                self.enter()?;
                self.advance();
                let inner = self.parse_predicate_bp(0);
                self.depth -= 1;
                let inner = inner?;
                self.expect(&TokenKind::RightParen, "expected ')'")?;
                Ok(inner)
            }
            _ => {
                self.conditions += 1;
                if self.conditions > MAX_CONDITIONS {
                    return Err(self.error("predicate has too many conditions"));
                }
                self.parse_condition()
            }
        }
    }

    fn enter(&mut self) -> Result<(), QueryError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("predicate nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_condition(&mut self) -> Result<Predicate, QueryError> {
        let operand = self.parse_operand()?;

        let op = match self.peek_kind() {
            TokenKind::Eq | TokenKind::EqEq => Some(CompareOp::Eq),
            TokenKind::Ne | TokenKind::LtGt => Some(CompareOp::Ne),
            TokenKind::Lt => Some(CompareOp::Lt),
            TokenKind::Le => Some(CompareOp::Le),
            TokenKind::Gt => Some(CompareOp::Gt),
            TokenKind::Ge => Some(CompareOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_operand()?;
            return Ok(Predicate::Compare {
                left: operand,
                op,
                right,
            });
        }

        if self.eat(&TokenKind::KwIs) {
            let negated = self.eat(&TokenKind::KwNot);
            self.expect(&TokenKind::KwNull, "expected NULL after IS")?;
            return Ok(Predicate::IsNull { operand, negated });
        }

        let negated = self.eat(&TokenKind::KwNot);
        match self.peek_kind() {
            TokenKind::KwLike => {
                self.advance();
                let pattern = self.parse_operand()?;
                Ok(Predicate::Like {
                    operand,
                    pattern,
                    negated,
                })
            }
            TokenKind::KwIn => {
                self.advance();
                self.expect(&TokenKind::LeftParen, "expected '(' after IN")?;
                let mut list = vec![self.parse_operand()?];
                while self.eat(&TokenKind::Comma) {
                    list.push(self.parse_operand()?);
                }
                self.expect(&TokenKind::RightParen, "expected ')' to close IN list")?;
                Ok(Predicate::In {
                    operand,
                    list,
                    negated,
                })
            }
            TokenKind::KwBetween => {
                self.advance();
                let low = self.parse_operand()?;
                self.expect(&TokenKind::KwAnd, "expected AND in BETWEEN")?;
                let high = self.parse_operand()?;
                Ok(Predicate::Between {
                    operand,
                    low,
                    high,
                    negated,
                })
            }
            _ if negated => Err(self.error("expected LIKE, IN or BETWEEN after NOT")),
            _ => Err(self.error("expected a comparison operator")),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, QueryError> {
        let token = self.advance();
        let literal = match token.kind {
            TokenKind::String(s) => Literal::Text(s),
            TokenKind::Integer(i) => Literal::Integer(i),
            TokenKind::Real(r) => Literal::Real(r),
            TokenKind::KwNull => Literal::Null,
            TokenKind::KwTrue => Literal::Bool(true),
            TokenKind::KwFalse => Literal::Bool(false),
            TokenKind::Minus => match self.advance().kind {
                TokenKind::Integer(i) => Literal::Integer(-i),
                TokenKind::Real(r) => Literal::Real(-r),
                _ => {
                    return Err(QueryError::syntax(
                        token.offset,
                        "expected a number after '-'",
                    ))
                }
            },
            TokenKind::Ident(table) | TokenKind::QuotedIdent(table) => {
                if !self.eat(&TokenKind::Dot) {
                    return Err(QueryError::syntax(
                        token.offset,
                        format!("column '{table}' must be written as table.column"),
                    ));
                }
                let column = match self.advance().kind {
                    TokenKind::Ident(c) | TokenKind::QuotedIdent(c) => c,
                    _ => {
                        return Err(QueryError::syntax(
                            token.offset,
                            "expected a column name after '.'",
                        ))
                    }
                };
                return Ok(Operand::Column { table, column });
            }
            TokenKind::Eof => {
                return Err(QueryError::syntax(token.offset, "unexpected end of predicate"))
            }
            _ => return Err(QueryError::syntax(token.offset, "expected a column or a value")),
        };
        Ok(Operand::Literal(literal))
    }

    fn peek_kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.offset)
    }

    /// Consume the current token; at the end keep returning `Eof`
    fn advance(&mut self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => {
                let token = token.clone();
                if token.kind != TokenKind::Eof {
                    self.pos += 1;
                }
                token
            }
            None => Token {
                kind: TokenKind::Eof,
                offset: self.offset(),
            },
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<(), QueryError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> QueryError {
        QueryError::syntax(self.offset(), message)
    }
}
