//! Filter predicates over the joined study row.
//!
//! A predicate is a small boolean expression language: comparisons, `IS NULL`,
//! `LIKE`, `IN`, `BETWEEN` and the `AND`/`OR`/`NOT` connectives over
//! `table.column` references and literals. Nothing outside that grammar is
//! accepted, so caller text never reaches the database as SQL.

pub mod compile;
pub mod lexer;
pub mod parser;

pub use compile::CompiledPredicate;
pub use parser::{CompareOp, Literal, Operand, Predicate};

use crate::errors::QueryError;

/// Parse and bind a predicate against the joined row schema
pub fn prepare(source: &str) -> Result<CompiledPredicate, QueryError> {
    if source.trim().is_empty() {
        return Err(QueryError::EmptyPredicate);
    }
    let predicate = parser::parse(source)?;
    compile::compile(&predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_predicate_is_empty() {
        assert!(matches!(prepare("  \n"), Err(QueryError::EmptyPredicate)));
    }

    #[test]
    fn test_deeply_nested_predicate_is_rejected() {
        let source = format!("{}study.id = 1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert!(matches!(prepare(&source), Err(QueryError::Syntax { .. })));
    }
}
