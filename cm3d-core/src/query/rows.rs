//! Assembly of joined rows into flat records.

use indexmap::IndexMap;
use sea_orm::{DbErr, QueryResult};
use serde::Serialize;
use serde_json::{Number, Value};

use super::schema::{ColumnKind, ColumnSpec, TableSpec, DATA_COLUMN, DATA_PREFIX, MEASUREMENT, TABLES};

/// One flat output row: `table.column` -> value, in column order
pub type Record = IndexMap<String, Value>;

/// Records plus the union of their keys in first-seen order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen = indexmap::IndexSet::new();
        for record in &records {
            for key in record.keys() {
                if !seen.contains(key.as_str()) {
                    seen.insert(key.clone());
                }
            }
        }
        Self {
            columns: seen.into_iter().collect(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

/// Build the record for one joined row.
///
/// Entities whose id is null (missing from the outer join) contribute nothing,
/// so a row with every side null becomes an empty record.
pub fn assemble(row: &QueryResult, flatten: bool) -> Result<Record, DbErr> {
    let mut record = Record::new();
    for table in TABLES {
        if let Some(mut entity) = read_entity(row, table)? {
            if flatten && table.alias == MEASUREMENT.alias {
                flatten_data(&mut entity);
            }
            record.extend(entity);
        }
    }
    Ok(record)
}

fn read_entity(row: &QueryResult, table: &TableSpec) -> Result<Option<Record>, DbErr> {
    let mut entity = Record::new();
    for column in table.columns {
        let key = table.key(column);
        let value = read_value(row, &key, column)?;
        if column.name == "id" && value.is_null() {
            return Ok(None);
        }
        entity.insert(key, value);
    }
    Ok(Some(entity))
}

fn read_value(row: &QueryResult, key: &str, column: &ColumnSpec) -> Result<Value, DbErr> {
    let value = match column.kind {
        ColumnKind::Integer => row
            .try_get::<Option<i64>>("", key)?
            .map_or(Value::Null, Value::from),
        ColumnKind::Real => row
            .try_get::<Option<f64>>("", key)?
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        ColumnKind::Text | ColumnKind::Date => row
            .try_get::<Option<String>>("", key)?
            .map_or(Value::Null, Value::String),
        ColumnKind::Json => match row.try_get::<Option<String>>("", key)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                DbErr::Json(format!("column {key} does not hold valid JSON: {e}"))
            })?,
            None => Value::Null,
        },
    };
    Ok(value)
}

/// Replace `measurement.data` with one `measurement.data_<key>` entry per bag key
pub fn flatten_data(entity: &mut Record) {
    let data_key = format!("{}.{}", MEASUREMENT.alias, DATA_COLUMN);
    if let Some(data) = entity.shift_remove(&data_key) {
        if let Value::Object(bag) = data {
            for (key, value) in bag {
                entity.insert(format!("{}.{}{}", MEASUREMENT.alias, DATA_PREFIX, key), value);
            }
        }
    }
}
