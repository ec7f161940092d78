use crate::errors::RuntimeError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One saved record of a profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    /// Current paragraph tag.
    pub cur_para: String,
    /// Current text index.
    pub cur_act: usize,
    pub locals: BTreeMap<String, Value>,
}

/// Reads every `*.json` record in `dir`, ordered by file name.
pub fn load_records(dir: &Path) -> Result<Vec<RawRecord>, RuntimeError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| RuntimeError::io(dir, e))? {
        let path = entry.map_err(|e| RuntimeError::io(dir, e))?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let buffer = fs::read(&path).map_err(|e| RuntimeError::io(&path, e))?;
            serde_json::from_slice(&buffer).map_err(|source| RuntimeError::Json { path, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_load_in_file_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("1.json"),
            r#"{ "cur_para": "ending", "locals": { "score": 10 } }"#,
        )
        .unwrap();
        fs::write(dir.path().join("0.json"), r#"{ "cur_para": "intro", "cur_act": 3 }"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = vec![
            RawRecord {
                cur_para: "intro".to_string(),
                cur_act: 3,
                ..Default::default()
            },
            RawRecord {
                cur_para: "ending".to_string(),
                cur_act: 0,
                locals: BTreeMap::from([("score".to_string(), Value::from(10))]),
            },
        ];
        assert_eq!(load_records(dir.path()).unwrap(), records);
    }

    #[test]
    fn test_bad_record_fails_the_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0.json"), "{not json").unwrap();
        assert!(matches!(
            load_records(dir.path()),
            Err(RuntimeError::Json { .. })
        ));
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_records(&dir.path().join("absent")).is_err());
    }
}
