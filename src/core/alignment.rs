use crate::core::error::{ModelError, PredictionError};
use crate::models::{Record, RecordBatch};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Ordered feature names a model consumes
///
/// The order is authoritative: it is the column order of every
/// [`AlignedMatrix`] built against this schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, ModelError> {
        if names.is_empty() {
            return Err(ModelError::NoFeatures);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ModelError::EmptyFeatureName(position));
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelError::DuplicateFeature(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Row-major numeric matrix with one column per schema feature
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMatrix {
    n_features: usize,
    values: Vec<f64>,
}

impl AlignedMatrix {
    pub fn from_rows(n_features: usize, rows: Vec<Vec<f64>>) -> Result<Self, PredictionError> {
        let mut values = Vec::with_capacity(rows.len() * n_features);
        for row in rows {
            if row.len() != n_features {
                return Err(PredictionError::ShapeMismatch {
                    expected: n_features,
                    found: row.len(),
                });
            }
            values.extend(row);
        }
        Ok(Self { n_features, values })
    }

    pub fn n_rows(&self) -> usize {
        if self.n_features == 0 {
            0
        } else {
            self.values.len() / self.n_features
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.n_features)?;
        self.values.get(start..start + self.n_features)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.values.chunks_exact(self.n_features.max(1))
    }
}

/// Coerce one JSON value to a feature value
///
/// Finite numbers pass through, booleans become 1/0, strings are parsed
/// after trimming. Everything else, including null and any parse failure,
/// becomes 0.
pub fn coerce_value(value: &Value) -> f64 {
    let coerced = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    match coerced {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Project a record onto the schema: missing features become 0, extra
/// fields are ignored
pub fn align_record(schema: &FeatureSchema, record: &Record) -> Vec<f64> {
    schema
        .names()
        .iter()
        .map(|name| record.get(name).map(coerce_value).unwrap_or(0.0))
        .collect()
}

/// Align every record of a batch, preserving input order
pub fn align_batch(schema: &FeatureSchema, batch: &RecordBatch) -> AlignedMatrix {
    let mut values = Vec::with_capacity(batch.len() * schema.len());
    for record in batch {
        values.extend(align_record(schema, record));
    }
    AlignedMatrix {
        n_features: schema.len(),
        values,
    }
}

/// Interpret a JSON payload as a record batch
///
/// Accepts an array of objects, or an object of equal-length arrays keyed by
/// column. A string holding one of those encodings is decoded once, which is
/// what dashboards that double-encode their payload send.
pub fn parse_batch(payload: Value) -> Result<RecordBatch, PredictionError> {
    match payload {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(inner @ (Value::Array(_) | Value::Object(_))) => parse_tabular(inner),
            _ => Err(PredictionError::NonTabular(
                "expected an array of records, got a string".to_string(),
            )),
        },
        other => parse_tabular(other),
    }
}

fn parse_tabular(payload: Value) -> Result<RecordBatch, PredictionError> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                _ => Err(PredictionError::NonObjectRecord { index }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RecordBatch::new),
        Value::Object(columns) => parse_columns(columns),
        other => Err(PredictionError::NonTabular(format!(
            "expected an array of records, got {}",
            json_type_name(&other)
        ))),
    }
}

fn parse_columns(columns: serde_json::Map<String, Value>) -> Result<RecordBatch, PredictionError> {
    let mut expected: Option<usize> = None;
    let mut arrays: HashMap<String, Vec<Value>> = HashMap::with_capacity(columns.len());

    for (column, value) in columns {
        let cells = match value {
            Value::Array(cells) => cells,
            other => {
                return Err(PredictionError::NonTabular(format!(
                    "column '{}' is {}, expected an array",
                    column,
                    json_type_name(&other)
                )));
            }
        };

        match expected {
            None => expected = Some(cells.len()),
            Some(n) if n != cells.len() => {
                return Err(PredictionError::RaggedColumns {
                    column,
                    expected: n,
                    found: cells.len(),
                });
            }
            Some(_) => {}
        }
        arrays.insert(column, cells);
    }

    let n_rows = expected.unwrap_or(0);
    let mut records = vec![Record::new(); n_rows];
    for (column, cells) in arrays {
        for (record, cell) in records.iter_mut().zip(cells) {
            record.insert(column.clone(), cell);
        }
    }

    Ok(RecordBatch::new(records))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec!["income".into(), "age".into(), "debt".into()]).unwrap()
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert_eq!(FeatureSchema::new(vec![]), Err(ModelError::NoFeatures));
        assert_eq!(
            FeatureSchema::new(vec!["a".into(), "a".into()]),
            Err(ModelError::DuplicateFeature("a".into()))
        );
        assert_eq!(
            FeatureSchema::new(vec!["a".into(), "".into()]),
            Err(ModelError::EmptyFeatureName(1))
        );
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!(42)), 42.0);
        assert_eq!(coerce_value(&json!(-1.5)), -1.5);
        assert_eq!(coerce_value(&json!(true)), 1.0);
        assert_eq!(coerce_value(&json!(false)), 0.0);
        assert_eq!(coerce_value(&json!(" 12.5 ")), 12.5);
        assert_eq!(coerce_value(&json!("1e3")), 1000.0);
        assert_eq!(coerce_value(&json!("abc")), 0.0);
        assert_eq!(coerce_value(&json!("")), 0.0);
        assert_eq!(coerce_value(&json!("NaN")), 0.0);
        assert_eq!(coerce_value(&json!("inf")), 0.0);
        assert_eq!(coerce_value(&json!("1e400")), 0.0);
        assert_eq!(coerce_value(&Value::Null), 0.0);
        assert_eq!(coerce_value(&json!([1, 2])), 0.0);
        assert_eq!(coerce_value(&json!({"a": 1})), 0.0);
    }

    #[test]
    fn test_align_record_fills_missing_and_drops_extra() {
        let rec = record(json!({"age": 35, "income": 50000, "zip": "75001"}));
        assert_eq!(align_record(&schema(), &rec), vec![50000.0, 35.0, 0.0]);
    }

    #[test]
    fn test_align_batch_preserves_order() {
        let batch = RecordBatch::new(vec![
            record(json!({"income": 1})),
            record(json!({"income": 2, "debt": "oops"})),
            record(json!({"income": 3, "age": null})),
        ]);
        let matrix = align_batch(&schema(), &batch);

        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_features(), 3);
        assert_eq!(matrix.row(0), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(matrix.row(1), Some(&[2.0, 0.0, 0.0][..]));
        assert_eq!(matrix.row(2), Some(&[3.0, 0.0, 0.0][..]));
        assert_eq!(matrix.row(3), None);
    }

    #[test]
    fn test_parse_record_array() {
        let batch = parse_batch(json!([{"a": 1}, {"b": "x"}])).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[1].get("b"), Some(&json!("x")));
    }

    #[test]
    fn test_parse_empty_array_is_empty_batch() {
        let batch = parse_batch(json!([])).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_parse_columns() {
        let batch = parse_batch(json!({"income": [10, 20], "age": [30, 40]})).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[0].get("income"), Some(&json!(10)));
        assert_eq!(batch.records()[1].get("age"), Some(&json!(40)));
    }

    #[test]
    fn test_parse_ragged_columns() {
        let err = parse_batch(json!({"income": [10, 20], "age": [30]})).unwrap_err();
        assert!(matches!(err, PredictionError::RaggedColumns { .. }));
    }

    #[test]
    fn test_parse_scalar_object_is_not_tabular() {
        let err = parse_batch(json!({"income": 10})).unwrap_err();
        assert!(matches!(err, PredictionError::NonTabular(_)));
    }

    #[test]
    fn test_parse_rejects_non_object_records() {
        assert_eq!(
            parse_batch(json!([{"a": 1}, 2])),
            Err(PredictionError::NonObjectRecord { index: 1 })
        );
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(parse_batch(json!(12)), Err(PredictionError::NonTabular(_))));
        assert!(matches!(parse_batch(Value::Null), Err(PredictionError::NonTabular(_))));
        assert!(matches!(parse_batch(json!("hello")), Err(PredictionError::NonTabular(_))));
    }

    #[test]
    fn test_parse_double_encoded_payload() {
        let payload = Value::String(r#"[{"income": 5}]"#.to_string());
        let batch = parse_batch(payload).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_matrix_from_rows_checks_width() {
        let err = AlignedMatrix::from_rows(2, vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert_eq!(err, PredictionError::ShapeMismatch { expected: 2, found: 1 });
    }
}
