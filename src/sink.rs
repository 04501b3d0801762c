//! Destinations for finished records
//!
//! A sink takes one record at a time. Before anything is written, an
//! embedding that is empty or holds non-finite values is dropped from the
//! record so every stored vector is a flat list of numbers.

use crate::error::SinkError;
use crate::types::FunctionRecord;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Something that accepts records one at a time
pub trait RecordSink {
    fn append(&mut self, record: &FunctionRecord) -> Result<(), SinkError>;

    /// Push buffered output to its destination
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<FunctionRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FunctionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FunctionRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &FunctionRecord) -> Result<(), SinkError> {
        self.records.push(sanitize(record).into_owned());
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
}

impl JsonLinesSink<File> {
    /// Create (or truncate) the file at `path`, creating parent directories.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        create_parent(path)?;
        let file = File::create(path)
            .map_err(|e| SinkError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::WriteFailed(e.error().to_string()))
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn append(&mut self, record: &FunctionRecord) -> Result<(), SinkError> {
        let record = sanitize(record);
        let line = serde_json::to_string(record.as_ref()).map_err(|e| {
            SinkError::SerializeFailed {
                file: record.file_path.clone(),
                reason: e.to_string(),
            }
        })?;

        writeln!(self.writer, "{}", line).map_err(|e| SinkError::WriteFailed(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::WriteFailed(e.to_string()))
    }
}

/// Write all records to `path` as one pretty-printed JSON array.
///
/// Returns how many records were written.
pub fn write_json_array(path: &Path, records: &[FunctionRecord]) -> Result<usize, SinkError> {
    create_parent(path)?;

    let cleaned: Vec<Cow<'_, FunctionRecord>> = records.iter().map(sanitize).collect();
    let file = File::create(path)
        .map_err(|e| SinkError::WriteFailed(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &cleaned).map_err(|e| {
        SinkError::SerializeFailed {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    writer
        .flush()
        .map_err(|e| SinkError::WriteFailed(e.to_string()))?;

    tracing::info!("Wrote {} records to {}", cleaned.len(), path.display());
    Ok(cleaned.len())
}

/// Append every record, logging and skipping the ones the sink rejects.
///
/// Returns how many were appended.
pub fn drain_into<'a, S>(
    records: impl IntoIterator<Item = &'a FunctionRecord>,
    sink: &mut S,
) -> usize
where
    S: RecordSink + ?Sized,
{
    let mut stored = 0;
    for record in records {
        match sink.append(record) {
            Ok(()) => stored += 1,
            Err(e) => tracing::error!("Failed to store record from {}: {}", record.file_path, e),
        }
    }

    if let Err(e) = sink.flush() {
        tracing::error!("Failed to flush record sink: {}", e);
    }

    stored
}

fn sanitize(record: &FunctionRecord) -> Cow<'_, FunctionRecord> {
    if record.embedding_is_valid() {
        return Cow::Borrowed(record);
    }

    tracing::warn!(
        "Dropping malformed embedding for function in {}",
        record.file_path
    );
    let mut cleaned = record.clone();
    cleaned.embedding = None;
    Cow::Owned(cleaned)
}

fn create_parent(path: &Path) -> Result<(), SinkError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| SinkError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::SupportedLanguage;
    use tempfile::TempDir;

    fn record(file_path: &str, embedding: Option<Vec<f32>>) -> FunctionRecord {
        FunctionRecord {
            repo_id: "repo".to_string(),
            file_path: file_path.to_string(),
            language: SupportedLanguage::Go,
            function_code: "func Foo() { return 1 }".to_string(),
            summary: "Function/method starting with `func Foo() { return 1 }`.".to_string(),
            embedding,
        }
    }

    /// Rejects records from one file
    struct PickySink {
        inner: MemorySink,
        reject: &'static str,
    }

    impl RecordSink for PickySink {
        fn append(&mut self, record: &FunctionRecord) -> Result<(), SinkError> {
            if record.file_path == self.reject {
                return Err(SinkError::WriteFailed("rejected".to_string()));
            }
            self.inner.append(record)
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        let records = vec![record("a.go", None), record("b.go", Some(vec![1.0]))];
        assert_eq!(drain_into(&records, &mut sink), 2);
        assert_eq!(sink.records(), records.as_slice());
    }

    #[test]
    fn test_invalid_embedding_stripped() {
        let mut sink = MemorySink::new();
        sink.append(&record("nan.go", Some(vec![f32::NAN, 1.0]))).unwrap();
        sink.append(&record("empty.go", Some(vec![]))).unwrap();
        sink.append(&record("ok.go", Some(vec![0.5]))).unwrap();

        let stored = sink.into_records();
        assert!(stored[0].embedding.is_none());
        assert!(stored[1].embedding.is_none());
        assert_eq!(stored[2].embedding, Some(vec![0.5]));
        assert_eq!(stored[0].function_code, "func Foo() { return 1 }");
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let records = vec![record("a.go", Some(vec![0.25])), record("b.go", None)];
        assert_eq!(drain_into(&records, &mut sink), 2);

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: FunctionRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, records[0]);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["repo_url"], "repo");
        assert!(second.get("embedding").is_none());
    }

    #[test]
    fn test_json_lines_sink_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("records.jsonl");
        let mut sink = JsonLinesSink::create(&path).unwrap();
        drain_into(&[record("a.go", None)], &mut sink);
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_write_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("outputs").join("summaries.json");
        let records = vec![
            record("a.go", Some(vec![1.0, 2.0])),
            record("b.go", Some(vec![f32::INFINITY])),
        ];

        assert_eq!(write_json_array(&path, &records).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], records[0]);
        assert!(parsed[1].embedding.is_none());
    }

    #[test]
    fn test_write_empty_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        assert_eq!(write_json_array(&path, &[]).unwrap(), 0);
        let parsed: Vec<FunctionRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_drain_continues_past_rejected_record() {
        let mut sink = PickySink {
            inner: MemorySink::new(),
            reject: "b.go",
        };
        let records = vec![record("a.go", None), record("b.go", None), record("c.go", None)];

        assert_eq!(drain_into(&records, &mut sink), 2);
        let stored: Vec<&str> = sink
            .inner
            .records()
            .iter()
            .map(|r| r.file_path.as_str())
            .collect();
        assert_eq!(stored, vec!["a.go", "c.go"]);
    }
}
