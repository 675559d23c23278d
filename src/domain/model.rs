use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of person data, field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|value| value.as_str())
    }
}

/// An ordered collection of records together with the observed column order.
///
/// Columns are the union of field names seen across the records. Keeping the
/// order explicit means the output header never depends on map iteration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.push(record);
        }
        set
    }

    /// Builds a record set from untyped JSON, expecting an array of objects.
    ///
    /// Anything else is a structural error on the whole input and fails with
    /// `MalformedInput`; per-field problems are left for the cleaning rules.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(EtlError::MalformedInput {
                    message: format!("expected an array of records, got {}", json_type(&other)),
                });
            }
        };

        let mut set = Self::new();
        for (index, item) in items.into_iter().enumerate() {
            match item {
                serde_json::Value::Object(fields) => {
                    let mut data = HashMap::new();
                    for (key, value) in fields {
                        data.insert(key, value);
                    }
                    set.push(Record { data });
                }
                other => {
                    return Err(EtlError::MalformedInput {
                        message: format!(
                            "record {} is not a field mapping, got {}",
                            index,
                            json_type(&other)
                        ),
                    });
                }
            }
        }
        Ok(set)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record, extending the column list with any unseen field
    /// names (sorted, so column order stays deterministic).
    pub fn push(&mut self, record: Record) {
        let mut unseen: Vec<&String> = record
            .data
            .keys()
            .filter(|key| !self.columns.contains(*key))
            .collect();
        unseen.sort();
        for key in unseen {
            self.columns.push(key.clone());
        }
        self.records.push(record);
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub(crate) fn from_parts(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Rebuilds the set with the same columns and a transformed record list.
    pub fn map_records<F>(self, f: F) -> Self
    where
        F: FnMut(Record) -> Record,
    {
        let columns = self.columns;
        let records = self.records.into_iter().map(f).collect();
        Self { columns, records }
    }

    /// Rebuilds the set keeping only records matching the predicate.
    pub fn filter_records<F>(self, mut f: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        let columns = self.columns;
        let records = self.records.into_iter().filter(|record| f(record)).collect();
        Self { columns, records }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Outcome of the transform stage: the cleaned records plus drop counts for
/// progress reporting.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: RecordSet,
    pub report: TransformReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub input_records: usize,
    pub dropped_incomplete: usize,
    pub dropped_duplicates: usize,
    /// Records dropped by the age rule: under 18 or an unparseable birth date.
    pub dropped_minors: usize,
    pub output_records: usize,
}
