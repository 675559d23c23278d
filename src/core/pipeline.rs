use crate::core::transform;
use crate::domain::model::{Record, RecordSet, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

pub const OUTPUT_FILENAME: &str = "transformed_people.csv";

/// File-based pipeline: reads a tabular source (CSV, or a JSON array of
/// records), runs the cleaning rules, and writes the result as CSV.
pub struct CsvPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CsvPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn destination(&self) -> String {
        format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            OUTPUT_FILENAME
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvPipeline<S, C> {
    async fn extract(&self) -> Result<RecordSet> {
        let path = self.config.source_path();
        tracing::debug!("Reading source dataset from: {}", path);

        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|error| match error {
                EtlError::IoError(source) => EtlError::SourceUnavailable {
                    path: path.to_string(),
                    source,
                },
                other => other,
            })?;

        if path.ends_with(".json") {
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            return RecordSet::from_value(value);
        }
        read_csv_records(&bytes)
    }

    async fn transform(&self, data: RecordSet) -> Result<TransformResult> {
        let today = chrono::Utc::now().date_naive();
        tracing::debug!("Applying cleaning rules, ages evaluated at {}", today);
        Ok(transform::transform_at(data, today))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let destination = self.destination();
        let bytes = write_csv_records(&result.records)?;

        tracing::debug!(
            "Writing {} records ({} bytes) to: {}",
            result.records.len(),
            bytes.len(),
            destination
        );

        self.storage
            .write_file(&destination, &bytes)
            .await
            .map_err(|error| match error {
                EtlError::IoError(source) => EtlError::DestinationUnwritable {
                    path: destination.clone(),
                    source,
                },
                other => other,
            })?;

        Ok(destination)
    }
}

fn read_csv_records(bytes: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut set = RecordSet::with_columns(headers.clone());
    for row in reader.records() {
        let row = row?;
        let mut data = HashMap::new();
        for (column, field) in headers.iter().zip(row.iter()) {
            data.insert(column.clone(), parse_csv_field(field));
        }
        set.push(Record { data });
    }
    Ok(set)
}

// Empty fields become null (so the completeness filter sees them); clean
// integers and floats become numbers; everything else stays text.
fn parse_csv_field(field: &str) -> serde_json::Value {
    if field.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(int) = field.parse::<i64>() {
        return serde_json::Value::from(int);
    }
    if let Ok(float) = field.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return serde_json::Value::Number(number);
        }
    }
    serde_json::Value::String(field.to_string())
}

fn write_csv_records(set: &RecordSet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(set.columns())?;

    for record in set.records() {
        let row: Vec<String> = set
            .columns()
            .iter()
            .map(|column| record.get(column).map(render_csv_field).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| EtlError::IoError(std::io::Error::other(error.to_string())))?;
    Ok(bytes)
}

fn render_csv_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Number(number) => number.to_string(),
        serde_json::Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source_path: String,
        output_path: String,
    }

    impl MockConfig {
        fn new(source_path: &str) -> Self {
            Self {
                source_path: source_path.to_string(),
                output_path: "test_output".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_path(&self) -> &str {
            &self.source_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }
    }

    #[tokio::test]
    async fn test_extract_csv_with_nulls_and_numbers() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "people.csv",
                b"email,phone,index\na@b.com,555-123-4567,1\nc@d.com,,2\n",
            )
            .await;
        let pipeline = CsvPipeline::new(storage, MockConfig::new("people.csv"));

        let set = pipeline.extract().await.unwrap();

        assert_eq!(set.columns(), ["email", "phone", "index"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].get_str("phone"), Some("555-123-4567"));
        assert!(set.records()[1].get("phone").unwrap().is_null());
        assert_eq!(set.records()[1].get("index").unwrap().as_i64(), Some(2));
    }

    #[tokio::test]
    async fn test_extract_json_array() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "people.json",
                br#"[{"email": "A@B.com", "phone": 5551234567}]"#,
            )
            .await;
        let pipeline = CsvPipeline::new(storage, MockConfig::new("people.json"));

        let set = pipeline.extract().await.unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].get_str("email"), Some("A@B.com"));
    }

    #[tokio::test]
    async fn test_extract_json_wrong_shape_is_malformed_input() {
        let storage = MockStorage::new();
        storage
            .put_file("people.json", br#"{"email": "a@b.com"}"#)
            .await;
        let pipeline = CsvPipeline::new(storage, MockConfig::new("people.json"));

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, EtlError::MalformedInput { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_source() {
        let storage = MockStorage::new();
        let pipeline = CsvPipeline::new(storage, MockConfig::new("missing.csv"));

        let err = pipeline.extract().await.unwrap_err();

        match err {
            EtlError::SourceUnavailable { path, .. } => assert_eq!(path, "missing.csv"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_writes_csv_with_header_order() {
        let storage = MockStorage::new();
        let pipeline = CsvPipeline::new(storage.clone(), MockConfig::new("people.csv"));

        let mut set = RecordSet::with_columns(vec![
            "email".to_string(),
            "phone".to_string(),
            "age".to_string(),
        ]);
        let mut data = HashMap::new();
        data.insert("email".to_string(), serde_json::json!("a@b.com"));
        data.insert("phone".to_string(), serde_json::json!("(555) 123-4567"));
        data.insert("age".to_string(), serde_json::json!(34));
        set.push(Record { data });

        let result = TransformResult {
            records: set,
            report: Default::default(),
        };

        let destination = pipeline.load(result).await.unwrap();

        assert_eq!(destination, "test_output/transformed_people.csv");
        let written = storage.get_file(&destination).await.unwrap();
        let content = String::from_utf8(written).unwrap();
        assert_eq!(content, "email,phone,age\na@b.com,(555) 123-4567,34\n");
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end_collapses_phone_variants() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "people.csv",
                concat!(
                    "email,phone\n",
                    "jane@example.com,(555) 123-4567\n",
                    "jane@example.com,555.123.4567\n",
                )
                .as_bytes(),
            )
            .await;
        let pipeline = CsvPipeline::new(storage.clone(), MockConfig::new("people.csv"));

        let extracted = pipeline.extract().await.unwrap();
        let transformed = pipeline.transform(extracted).await.unwrap();
        assert_eq!(transformed.records.len(), 1);
        assert_eq!(transformed.report.dropped_duplicates, 1);

        let destination = pipeline.load(transformed).await.unwrap();
        let written = storage.get_file(&destination).await.unwrap();
        let content = String::from_utf8(written).unwrap();
        assert_eq!(content, "email,phone\njane@example.com,(555) 123-4567\n");
    }
}
