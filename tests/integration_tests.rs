use chrono::{Days, Utc};
use people_etl::{CliConfig, CsvPipeline, EtlEngine, EtlError, LocalStorage};
use tempfile::TempDir;

fn config_for(source: &str, output_path: &str) -> CliConfig {
    CliConfig {
        source: source.to_string(),
        output_path: output_path.to_string(),
        verbose: false,
        monitor: false,
    }
}

fn days_ago(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(days))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_end_to_end_csv_cleaning() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("people.csv");
    let output_path = temp_dir.path().join("output");

    let adult_dob = days_ago(35 * 365);
    let other_adult_dob = days_ago(30 * 365);
    let minor_dob = days_ago(10 * 365);

    let source = format!(
        "email,phone,job_title,date_of_birth\n\
         Jane.Doe@EXAMPLE.com,555.123.4567,senior data engineer,{adult_dob}\n\
         jane.doe@example.com,(555) 123-4567,senior data engineer,{adult_dob}\n\
         incomplete@example.com,,analyst,{adult_dob}\n\
         kid@example.com,5559876543,intern,{minor_dob}\n\
         nodate@example.com,5550001111,clerk,unknown\n\
         john@example.com,555-1234,ANALYST,{other_adult_dob}\n"
    );
    std::fs::write(&source_path, source).unwrap();

    let config = config_for(
        source_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
    );
    let storage = LocalStorage::default();
    let pipeline = CsvPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    let result_path = engine.run().await.unwrap();
    assert!(result_path.ends_with("transformed_people.csv"));

    let output_file = output_path.join("transformed_people.csv");
    assert!(output_file.exists());

    let mut reader = csv::Reader::from_path(&output_file).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        ["email", "phone", "job_title", "date_of_birth", "age"]
    );

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|row| row.unwrap().iter().map(String::from).collect())
        .collect();

    // The two Jane variants collapse; the incomplete, minor, and
    // unparseable-date rows are dropped.
    assert_eq!(rows.len(), 2);

    let jane = &rows[0];
    assert_eq!(jane[0], "jane.doe@example.com");
    assert_eq!(jane[1], "(555) 123-4567");
    assert_eq!(jane[2], "Senior Data Engineer");
    assert_eq!(jane[4], "35");

    let john = &rows[1];
    assert_eq!(john[0], "john@example.com");
    assert_eq!(john[1], "5551234");
    assert_eq!(john[2], "Analyst");
    assert_eq!(john[4], "30");
}

#[tokio::test]
async fn test_end_to_end_json_source_without_birth_dates() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("people.json");
    let output_path = temp_dir.path().join("output");

    std::fs::write(
        &source_path,
        r#"[
            {"email": "Jane@Example.com", "phone": 5551234567},
            {"email": "jane@example.com", "phone": "(555) 123-4567"}
        ]"#,
    )
    .unwrap();

    let config = config_for(
        source_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
    );
    let pipeline = CsvPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    engine.run().await.unwrap();

    let content =
        std::fs::read_to_string(output_path.join("transformed_people.csv")).unwrap();

    // No date_of_birth in the schema, so no age column is ever added.
    assert_eq!(content, "email,phone\njane@example.com,(555) 123-4567\n");
}

#[tokio::test]
async fn test_missing_source_is_source_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("output");

    let config = config_for(
        temp_dir.path().join("missing.csv").to_str().unwrap(),
        output_path.to_str().unwrap(),
    );
    let pipeline = CsvPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::SourceUnavailable { .. }));

    // The run aborts before the load stage runs.
    assert!(!output_path.join("transformed_people.csv").exists());
}

#[tokio::test]
async fn test_malformed_json_aborts_before_load() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("people.json");
    let output_path = temp_dir.path().join("output");

    std::fs::write(&source_path, r#"{"email": "not-a-sequence"}"#).unwrap();

    let config = config_for(
        source_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
    );
    let pipeline = CsvPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::MalformedInput { .. }));
    assert!(!output_path.join("transformed_people.csv").exists());
}
