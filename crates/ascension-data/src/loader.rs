//! File discovery and deserialization for economy data files.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by [`crate::economy::load_economy`].

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Why an economy data directory failed to load.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// `unlocks.{ron,toml,json}` (or another mandatory file) is absent.
    #[error("no {file}.ron, {file}.toml or {file}.json in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// Only `.ron`, `.toml` and `.json` are read.
    #[error("{file}: expected a .ron, .toml or .json extension")]
    UnsupportedFormat { file: PathBuf },

    /// The same content file exists in two formats, e.g. `unlocks.ron`
    /// next to `unlocks.json`.
    #[error("{a} and {b} define the same content; keep one")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// Malformed file contents or an unparsable number.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An unlock node lists a requirement id that no node defines.
    #[error("{file}: {expected_kind} '{name}' is required but never defined")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// Two unlock nodes share an id.
    #[error("{file}: unlock node id '{name}' is defined twice")]
    DuplicateName { file: PathBuf, name: String },

    /// A requirement would make the unlock graph cyclic.
    #[error("{file}: '{node}' requiring '{required}' closes a cycle")]
    Cycle {
        file: PathBuf,
        node: String,
        required: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// On-disk encodings a content file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

const EXTENSIONS: [(&str, Format); 3] = [
    ("ron", Format::Ron),
    ("toml", Format::Toml),
    ("json", Format::Json),
];

/// The encoding implied by a file's extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    EXTENSIONS
        .iter()
        .find(|(known, _)| Some(*known) == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate the content file `{stem}.{ron,toml,json}` in `dir`.
///
/// `Ok(None)` when absent. More than one encoding of the same stem is a
/// [`DataLoadError::ConflictingFormats`] rather than a silent pick.
pub fn find_data_file(dir: &Path, stem: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = EXTENSIONS
        .iter()
        .map(|(ext, _)| dir.join(format!("{stem}.{ext}")))
        .filter(|path| path.is_file());

    let first = present.next();
    if let (Some(a), Some(b)) = (&first, present.next()) {
        return Err(DataLoadError::ConflictingFormats {
            a: a.clone(),
            b,
        });
    }
    Ok(first)
}

/// [`find_data_file`] for mandatory content such as the unlock tree.
pub fn require_data_file(dir: &Path, stem: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, stem)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: stem.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table (a missing key is an empty list).
/// For RON and JSON, deserializes directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    if format != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let Some(array) = table.remove(toml_key) else {
        return Ok(Vec::new());
    };
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Deserialize)]
    struct Entry {
        id: String,
    }

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ascension_loader_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_known_formats() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("unlocks.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("unlocks")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found() {
        let dir = make_test_dir("find_found");
        fs::write(dir.join("unlocks.json"), "[]").unwrap();

        let result = find_data_file(&dir, "unlocks").unwrap();
        assert_eq!(result, Some(dir.join("unlocks.json")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "unlocks").unwrap(), None);
        assert!(matches!(
            require_data_file(&dir, "unlocks"),
            Err(DataLoadError::MissingRequired { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn missing_unlocks_message_names_every_extension() {
        let err = require_data_file(Path::new("content"), "unlocks").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no unlocks.ron, unlocks.toml or unlocks.json in content"
        );
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("unlocks.ron"), "[]").unwrap();
        fs::write(dir.join("unlocks.json"), "[]").unwrap();

        assert!(matches!(
            find_data_file(&dir, "unlocks"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_file / deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_each_format() {
        let dir = make_test_dir("list_formats");

        let ron_path = dir.join("entries.ron");
        fs::write(&ron_path, r#"[(id: "a"), (id: "b")]"#).unwrap();
        let entries: Vec<Entry> = deserialize_list(&ron_path, "entries").unwrap();
        assert_eq!(entries.len(), 2);

        let json_path = dir.join("entries.json");
        fs::write(&json_path, r#"[{"id": "a"}]"#).unwrap();
        let entries: Vec<Entry> = deserialize_list(&json_path, "entries").unwrap();
        assert_eq!(entries[0].id, "a");

        let toml_path = dir.join("entries.toml");
        fs::write(&toml_path, "[[entries]]\nid = \"a\"\n\n[[entries]]\nid = \"c\"\n").unwrap();
        let entries: Vec<Entry> = deserialize_list(&toml_path, "entries").unwrap();
        assert_eq!(entries[1].id, "c");

        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key_is_empty() {
        let dir = make_test_dir("list_toml_empty");
        let path = dir.join("entries.toml");
        fs::write(&path, "title = \"nothing here\"\n").unwrap();

        let entries: Vec<Entry> = deserialize_list(&path, "entries").unwrap();
        assert!(entries.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("parse_error");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<Entry>, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_io_error() {
        let result: Result<Vec<Entry>, _> =
            deserialize_file(Path::new("/definitely/not/here/unlocks.json"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
    }
}
