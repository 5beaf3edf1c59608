//! Lowers a parsed predicate to a parameterised SQL condition.
//!
//! Column references are checked against the joined row schema; literals are
//! always bound as values and never spliced into the SQL text.

use sea_orm::Value;

use super::parser::{Literal, Operand, Predicate};
use crate::errors::QueryError;
use crate::query::schema::{quote_ident, ResolvedColumn, DATA_COLUMN, MEASUREMENT};

/// SQL condition with `?` placeholders and the values bound to them, in order
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPredicate {
    pub sql: String,
    pub values: Vec<Value>,
}

pub fn compile(predicate: &Predicate) -> Result<CompiledPredicate, QueryError> {
    let mut compiler = Compiler::default();
    let sql = compiler.predicate(predicate)?;
    Ok(CompiledPredicate {
        sql,
        values: compiler.values,
    })
}

#[derive(Default)]
struct Compiler {
    values: Vec<Value>,
}

impl Compiler {
    fn predicate(&mut self, predicate: &Predicate) -> Result<String, QueryError> {
        let sql = match predicate {
            Predicate::And(lhs, rhs) => {
                format!("({} AND {})", self.predicate(lhs)?, self.predicate(rhs)?)
            }
            Predicate::Or(lhs, rhs) => {
                format!("({} OR {})", self.predicate(lhs)?, self.predicate(rhs)?)
            }
            Predicate::Not(inner) => format!("(NOT {})", self.predicate(inner)?),
            Predicate::Compare { left, op, right } => {
                let left = self.operand(left)?;
                let right = self.operand(right)?;
                format!("{} {} {}", left, op.as_sql(), right)
            }
            Predicate::IsNull { operand, negated } => {
                let operand = self.operand(operand)?;
                format!("{} IS {}NULL", operand, not(*negated))
            }
            Predicate::Like {
                operand,
                pattern,
                negated,
            } => {
                let operand = self.operand(operand)?;
                let pattern = self.operand(pattern)?;
                format!("{} {}LIKE {}", operand, not(*negated), pattern)
            }
            Predicate::In {
                operand,
                list,
                negated,
            } => {
                let operand = self.operand(operand)?;
                let items = list
                    .iter()
                    .map(|item| self.operand(item))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{} {}IN ({})", operand, not(*negated), items.join(", "))
            }
            Predicate::Between {
                operand,
                low,
                high,
                negated,
            } => {
                let operand = self.operand(operand)?;
                let low = self.operand(low)?;
                let high = self.operand(high)?;
                format!("{} {}BETWEEN {} AND {}", operand, not(*negated), low, high)
            }
        };
        Ok(sql)
    }

    fn operand(&mut self, operand: &Operand) -> Result<String, QueryError> {
        match operand {
            Operand::Column { table, column } => match ResolvedColumn::resolve(table, column)? {
                ResolvedColumn::Stored { table, column } => Ok(table.sql_column(column)),
                ResolvedColumn::DataKey(key) => {
                    // The key is bound as text, so quotes and backslashes need no escaping
                    self.values.push(Value::from(key));
                    Ok(format!(
                        "(SELECT bag.value FROM json_each({}.{}) AS bag WHERE bag.key = ?)",
                        quote_ident(MEASUREMENT.alias),
                        quote_ident(DATA_COLUMN)
                    ))
                }
            },
            Operand::Literal(literal) => {
                let value = match literal {
                    Literal::Null => return Ok("NULL".to_string()),
                    Literal::Bool(b) => Value::from(*b),
                    Literal::Integer(i) => Value::from(*i),
                    Literal::Real(r) => Value::from(*r),
                    Literal::Text(s) => Value::from(s.clone()),
                };
                self.values.push(value);
                Ok("?".to_string())
            }
        }
    }
}

fn not(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}
