/// CSV rendering of query results
///
/// The header row is the record set's column union. Records that lack a
/// column, or hold null for it, get an empty cell. An unflattened attribute
/// bag is written as compact JSON.
use ::csv::Writer;
use serde_json::Value;

use crate::errors::ExportError;
use crate::query::RecordSet;

#[derive(Clone, Debug, Default)]
pub struct CsvOptions {
    /// When set, prepend a column with this header holding 0-based row numbers
    pub index_label: Option<String>,
}

impl CsvOptions {
    pub fn with_index(label: impl Into<String>) -> Self {
        Self {
            index_label: Some(label.into()),
        }
    }
}

pub fn records_to_csv(set: &RecordSet, options: &CsvOptions) -> Result<String, ExportError> {
    if set.columns.is_empty() {
        return Ok(String::new());
    }

    let mut wtr = Writer::from_writer(vec![]);

    let mut headers: Vec<&str> = Vec::with_capacity(set.columns.len() + 1);
    if let Some(label) = &options.index_label {
        headers.push(label);
    }
    headers.extend(set.columns.iter().map(String::as_str));
    wtr.write_record(&headers)?;

    for (index, record) in set.iter().enumerate() {
        let mut row: Vec<String> = Vec::with_capacity(headers.len());
        if options.index_label.is_some() {
            row.push(index.to_string());
        }
        row.extend(
            set.columns
                .iter()
                .map(|column| record.get(column).map(cell).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(data)?)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Record;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_missing_and_null_cells_are_empty() {
        let set = RecordSet::from_records(vec![
            record(&[("study.id", json!(1)), ("group.model", Value::Null)]),
            record(&[("study.id", json!(2)), ("measurement.value", json!(2.5))]),
        ]);

        let csv = records_to_csv(&set, &CsvOptions::default()).unwrap();
        assert_eq!(
            csv,
            "study.id,group.model,measurement.value\n1,,\n2,,2.5\n"
        );
    }

    #[test]
    fn test_index_column_and_nested_json() {
        let set = RecordSet::from_records(vec![record(&[
            ("study.title", json!("T, with comma")),
            ("measurement.data", json!({"Plate": 3})),
        ])]);

        let csv = records_to_csv(&set, &CsvOptions::with_index("number")).unwrap();
        assert_eq!(
            csv,
            "number,study.title,measurement.data\n0,\"T, with comma\",\"{\"\"Plate\"\":3}\"\n"
        );
    }

    #[test]
    fn test_empty_set_exports_nothing() {
        let csv = records_to_csv(&RecordSet::default(), &CsvOptions::default()).unwrap();
        assert!(csv.is_empty());
    }
}
