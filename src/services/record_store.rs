use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: expected a JSON array of records or a single record object")]
    Shape { path: String },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.display().to_string(), source }
}

/// Reads weather records from a JSON file. A lone object is treated as a
/// one-record batch.
pub fn load_records(path: &Path) -> Result<Vec<Value>, StoreError> {
    let file = File::open(path).map_err(io_error(path))?;
    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;

    match value {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Ok(vec![value]),
        _ => Err(StoreError::Shape { path: path.display().to_string() }),
    }
}

/// Writes the records as a pretty-printed JSON array, creating parent directories.
pub fn save_records(path: &Path, records: &[Value]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    writer.write_all(b"\n").map_err(io_error(path))?;
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_array_and_single_object() {
        let dir = tempfile::tempdir().unwrap();

        let many = dir.path().join("many.json");
        std::fs::write(&many, r#"[{"date": "2024-03-21"}, {"date": "2024-03-22"}]"#).unwrap();
        let records = load_records(&many).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["date"], json!("2024-03-22"));

        let one = dir.path().join("one.json");
        std::fs::write(&one, r#"{"date": "2024-03-21", "latitude": 34.08}"#).unwrap();
        let records = load_records(&one).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["latitude"], json!(34.08));
    }

    #[test]
    fn test_load_rejects_scalars_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let scalar = dir.path().join("scalar.json");
        std::fs::write(&scalar, "42").unwrap();
        assert!(matches!(load_records(&scalar), Err(StoreError::Shape { .. })));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "[{").unwrap();
        assert!(matches!(load_records(&garbage), Err(StoreError::Json { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_records(&missing), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");
        let records = vec![json!({ "id": 3 }), json!({ "id": 1, "simulation": { "daily_energy_ac_kwh": 1.2 } })];
        save_records(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  "), "output should be pretty-printed");
        assert_eq!(load_records(&path).unwrap(), records);
    }
}
