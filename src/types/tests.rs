use super::*;

fn record(file_path: &str, embedding: Option<Vec<f32>>) -> FunctionRecord {
    FunctionRecord {
        repo_id: "https://example.com/repo.git".to_string(),
        file_path: file_path.to_string(),
        language: SupportedLanguage::Python,
        function_code: "def f():\n    return 1".to_string(),
        summary: "Function/method starting with `def f():`.".to_string(),
        embedding,
    }
}

#[test]
fn test_record_serialization_keys() {
    let json = serde_json::to_value(record("pkg/a.py", Some(vec![0.5, -0.25]))).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object["repo_url"], "https://example.com/repo.git");
    assert_eq!(object["file_path"], "pkg/a.py");
    assert_eq!(object["language"], "python");
    assert_eq!(object["function_code"], "def f():\n    return 1");
    assert_eq!(object["summary"], "Function/method starting with `def f():`.");
    assert_eq!(object["embedding"], serde_json::json!([0.5, -0.25]));
    assert!(!object.contains_key("repo_id"));
}

#[test]
fn test_record_without_embedding_omits_key() {
    let json = serde_json::to_value(record("a.py", None)).unwrap();
    assert!(!json.as_object().unwrap().contains_key("embedding"));
}

#[test]
fn test_record_deserialize_without_embedding() {
    let json = r#"{
        "repo_url": "local",
        "file_path": "main.go",
        "language": "go",
        "function_code": "func Foo() { return 1 }",
        "summary": "Function/method starting with `func Foo() { return 1 }`."
    }"#;
    let parsed: FunctionRecord = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.repo_id, "local");
    assert_eq!(parsed.language, SupportedLanguage::Go);
    assert!(!parsed.has_embedding());
}

#[test]
fn test_embedding_validity() {
    assert!(record("a.py", None).embedding_is_valid());
    assert!(record("a.py", Some(vec![1.0, 2.0])).embedding_is_valid());
    assert!(!record("a.py", Some(vec![])).embedding_is_valid());
    assert!(!record("a.py", Some(vec![1.0, f32::NAN])).embedding_is_valid());
    assert!(!record("a.py", Some(vec![f32::NEG_INFINITY])).embedding_is_valid());
}

#[test]
fn test_processing_result_default() {
    let result = ProcessingResult::default();
    assert!(result.is_empty());
    assert_eq!(result.files_with_records, 0);
    assert_eq!(result.embeddings_generated(), 0);
    assert!(result.errors.is_empty());
    assert_eq!(result.preview(5), "");
}

#[test]
fn test_processing_result_counts_and_display() {
    let result = ProcessingResult {
        records: vec![record("a.py", Some(vec![1.0])), record("b.py", None)],
        files_with_records: 2,
        files_visited: 3,
        files_failed: 1,
        files_skipped: 0,
        errors: vec!["bad.py: syntax error".to_string()],
        duration_ms: 42,
    };

    assert_eq!(result.embeddings_generated(), 1);
    assert_eq!(
        result.to_string(),
        "2 functions from 2 files (3 visited, 1 failed, 0 skipped, 1 embedded) in 42 ms"
    );
}

#[test]
fn test_preview_limits_lines() {
    let result = ProcessingResult {
        records: vec![
            record("a.py", Some(vec![1.0])),
            record("b.py", None),
            record("c.py", None),
        ],
        ..Default::default()
    };

    let preview = result.preview(2);
    let lines: Vec<&str> = preview.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("a.py [python]"));
    assert!(lines[0].ends_with("(embedding: yes)"));
    assert!(lines[1].contains("b.py"));
    assert!(lines[1].ends_with("(embedding: no)"));
}
