//! Column namespace of the joined study row.
//!
//! Every output column is named `<table>.<column>` where `<table>` is the
//! singular alias used in the joined select (`study`, `group`,
//! `biological_replica`, `measurement`). The uploaded workbook column is not
//! part of the namespace.

use crate::errors::QueryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// Stored as `YYYY-MM-DD` text
    Date,
    /// Serialized JSON object
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableSpec {
    /// Alias in the joined select and prefix of output column names
    pub alias: &'static str,
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

use ColumnKind::{Date, Integer, Json, Real, Text};

pub static STUDY: TableSpec = TableSpec {
    alias: "study",
    table: "studies",
    columns: &[
        col("id", Integer),
        col("title", Text),
        col("authors", Text),
        col("date_input", Date),
        col("added_by", Text),
    ],
};

pub static GROUP: TableSpec = TableSpec {
    alias: "group",
    table: "groups",
    columns: &[
        col("id", Integer),
        col("study_id", Integer),
        col("model", Text),
        col("duration", Text),
        col("protein_treatment", Text),
        col("additional_supplementation", Text),
    ],
};

pub static BIOLOGICAL_REPLICA: TableSpec = TableSpec {
    alias: "biological_replica",
    table: "biological_replicas",
    columns: &[
        col("id", Integer),
        col("group_id", Integer),
        col("cell_name", Text),
        col("cell_origin", Text),
        col("receptor_expression", Text),
        col("media_composition", Text),
        col("passage_number", Integer),
        col("morphology", Text),
        col("patient_characteristics", Text),
    ],
};

pub static MEASUREMENT: TableSpec = TableSpec {
    alias: "measurement",
    table: "measurements",
    columns: &[
        col("id", Integer),
        col("biological_replica_id", Integer),
        col("method", Text),
        col("time_point", Text),
        col("value", Real),
        col("unit", Text),
        col("measurement", Text),
        col("test_type", Text),
        col("data", Json),
    ],
};

/// Tables in join order
pub static TABLES: [&TableSpec; 4] = [&STUDY, &GROUP, &BIOLOGICAL_REPLICA, &MEASUREMENT];

/// Column holding the measurement's attribute bag
pub const DATA_COLUMN: &str = "data";
/// Prefix of flattened attribute-bag columns
pub const DATA_PREFIX: &str = "data_";

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Output key for a column, e.g. `study.title`
    pub fn key(&self, column: &ColumnSpec) -> String {
        format!("{}.{}", self.alias, column.name)
    }

    /// Quoted column reference for SQL, e.g. `"study"."title"`
    pub fn sql_column(&self, column: &ColumnSpec) -> String {
        format!("{}.{}", quote_ident(self.alias), quote_ident(column.name))
    }
}

pub fn table(alias: &str) -> Option<&'static TableSpec> {
    TABLES.iter().copied().find(|t| t.alias == alias)
}

/// A column reference resolved against the joined row
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedColumn {
    Stored {
        table: &'static TableSpec,
        column: &'static ColumnSpec,
    },
    /// One key inside `measurement.data`
    DataKey(String),
}

impl ResolvedColumn {
    pub fn resolve(table_alias: &str, column: &str) -> Result<Self, QueryError> {
        let unknown = || QueryError::UnknownColumn(format!("{table_alias}.{column}"));
        let spec = table(table_alias).ok_or_else(unknown)?;

        if let Some(found) = spec.column(column) {
            return Ok(ResolvedColumn::Stored {
                table: spec,
                column: found,
            });
        }

        match column.strip_prefix(DATA_PREFIX) {
            Some(key) if spec.alias == MEASUREMENT.alias && !key.is_empty() => {
                Ok(ResolvedColumn::DataKey(key.to_string()))
            }
            _ => Err(unknown()),
        }
    }
}

/// Double-quote an SQL identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The joined select over all four tables, without WHERE or ORDER BY
pub fn select_sql() -> String {
    let columns: Vec<String> = TABLES
        .iter()
        .flat_map(|table| {
            table.columns.iter().map(move |column| {
                format!("{} AS {}", table.sql_column(column), quote_ident(&table.key(column)))
            })
        })
        .collect();

    format!(
        "SELECT {columns} FROM {studies} AS {study} \
         LEFT OUTER JOIN {groups} AS {group} ON {group}.\"study_id\" = {study}.\"id\" \
         LEFT OUTER JOIN {replicas} AS {replica} ON {replica}.\"group_id\" = {group}.\"id\" \
         LEFT OUTER JOIN {measurements} AS {measurement} ON {measurement}.\"biological_replica_id\" = {replica}.\"id\"",
        columns = columns.join(", "),
        studies = quote_ident(STUDY.table),
        study = quote_ident(STUDY.alias),
        groups = quote_ident(GROUP.table),
        group = quote_ident(GROUP.alias),
        replicas = quote_ident(BIOLOGICAL_REPLICA.table),
        replica = quote_ident(BIOLOGICAL_REPLICA.alias),
        measurements = quote_ident(MEASUREMENT.table),
        measurement = quote_ident(MEASUREMENT.alias),
    )
}

pub fn order_by_sql() -> String {
    let keys: Vec<String> = TABLES
        .iter()
        .map(|t| format!("{}.\"id\"", quote_ident(t.alias)))
        .collect();
    format!("ORDER BY {}", keys.join(", "))
}
