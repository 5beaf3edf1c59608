//! Denormalised views of the stored study graph.
//!
//! Both entry points run one select over
//! `study ⟕ group ⟕ biological_replica ⟕ measurement` on the store's read-only
//! handle and turn each joined row into a flat [`Record`]. Row count follows
//! the join cardinality: a study without groups still yields one row.

pub mod predicate;
pub mod rows;
pub mod schema;

use sea_orm::{ConnectionTrait, DbBackend, Statement, Value};
use tracing::debug;

use crate::database::store::Store;
use crate::errors::QueryError;

pub use rows::{Record, RecordSet};

/// Every joined row with the attribute bag flattened
pub async fn get_denormalised(store: &Store) -> Result<RecordSet, QueryError> {
    run(store, None, true).await
}

/// Joined rows matching `predicate`, e.g. `study.title = 'T1'`.
///
/// An empty predicate is rejected rather than treated as "everything". With
/// `flatten` the attribute bag is expanded into `measurement.data_<key>`
/// columns; otherwise it stays a single JSON object under `measurement.data`.
pub async fn get_filtered(
    store: &Store,
    predicate: &str,
    flatten: bool,
) -> Result<RecordSet, QueryError> {
    let compiled = predicate::prepare(predicate)?;
    run(store, Some((compiled.sql, compiled.values)), flatten).await
}

async fn run(
    store: &Store,
    condition: Option<(String, Vec<Value>)>,
    flatten: bool,
) -> Result<RecordSet, QueryError> {
    let (sql, values) = match condition {
        Some((condition, values)) => (
            format!("{} WHERE {} {}", schema::select_sql(), condition, schema::order_by_sql()),
            values,
        ),
        None => (
            format!("{} {}", schema::select_sql(), schema::order_by_sql()),
            Vec::new(),
        ),
    };

    let statement = Statement::from_sql_and_values(DbBackend::Sqlite, sql, values);
    let rows = store.reader().query_all(statement).await?;

    let records = rows
        .iter()
        .map(|row| rows::assemble(row, flatten))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Query returned {} rows", records.len());

    Ok(RecordSet::from_records(records))
}
