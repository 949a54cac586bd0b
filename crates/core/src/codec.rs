//! Reading and writing the search-index artifact.
//!
//! Documenter.jl writes the index as a JS assignment:
//!
//! ```text
//! var documenterSearchIndex = {"docs":
//! [{"location":"...","page":"...","title":"...","text":"...","category":"..."},...]
//! }
//! ```
//!
//! The parser also accepts the same payload as plain JSON, and a bare record
//! array in place of the `{"docs": [...]}` wrapper.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;

use docindex_common::{DEFAULT_VAR_NAME, DOCS_KEY, Error, Result, SearchIndex, SearchRecord};

use crate::common::Timer;

/// How to treat records that fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Abort on the first malformed record.
    Strict,
    /// Drop malformed records and keep going.
    #[default]
    Tolerant,
}

/// A record the tolerant parser skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    /// Zero-based position in the source array.
    pub position: usize,
    /// Decoder message.
    pub reason: String,
}

/// Result of parsing an artifact.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The decoded index.
    pub index: SearchIndex,
    /// Records skipped in tolerant mode, always empty in strict mode.
    pub dropped: Vec<DroppedRecord>,
    /// Source array position of each kept record.
    pub positions: Vec<usize>,
}

/// Serialization layout for [`render`] and [`write_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `var <name> = {"docs": [...]}` as Documenter writes it.
    #[default]
    Js,
    /// `{"docs": [...]}` on a single line.
    Json,
    /// `{"docs": [...]}` indented.
    JsonPretty,
}

#[derive(Serialize)]
struct Wrapper<'a> {
    docs: &'a [SearchRecord],
}

/// Parse an artifact from its text.
pub fn parse(input: &str, mode: ParseMode) -> Result<ParseOutcome> {
    let (var_name, payload) = split_assignment(input)?;
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::Syntax(format!("Invalid JSON payload: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(DOCS_KEY) {
            Some(Value::Array(items)) => {
                if !map.is_empty() {
                    let extra: Vec<&String> = map.keys().collect();
                    tracing::debug!("parse: ignoring wrapper keys {:?}", extra);
                }
                items
            }
            Some(_) => {
                return Err(Error::Syntax(format!("\"{DOCS_KEY}\" must be an array")));
            }
            None => {
                return Err(Error::Syntax(format!("Missing \"{DOCS_KEY}\" array")));
            }
        },
        _ => {
            return Err(Error::Syntax(
                "Expected an object or an array of records".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut positions = Vec::with_capacity(items.len());
    let mut dropped = Vec::new();

    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<SearchRecord>(item) {
            Ok(record) => {
                records.push(record);
                positions.push(position);
            }
            Err(e) => match mode {
                ParseMode::Strict => {
                    return Err(Error::MalformedRecord {
                        index: position,
                        reason: e.to_string(),
                    });
                }
                ParseMode::Tolerant => {
                    tracing::warn!("Dropping malformed record at position {}: {}", position, e);
                    dropped.push(DroppedRecord {
                        position,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    let var_name = var_name.unwrap_or(DEFAULT_VAR_NAME);
    Ok(ParseOutcome {
        index: SearchIndex::new(records).with_var_name(var_name),
        dropped,
        positions,
    })
}

/// Split `var name = payload;` into its name and payload.
///
/// Plain JSON input yields no name.
fn split_assignment(input: &str) -> Result<(Option<&str>, &str)> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok((None, trimmed));
    }

    let rest = ["var ", "let ", "const "]
        .iter()
        .find_map(|keyword| trimmed.strip_prefix(keyword))
        .ok_or_else(|| {
            Error::Syntax("Expected a `var <name> = ...` assignment or JSON".to_string())
        })?;

    let (name, payload) = rest
        .split_once('=')
        .ok_or_else(|| Error::Syntax("Missing '=' in assignment".to_string()))?;

    let name = name.trim();
    check_var_name(name)?;

    let payload = payload.trim();
    let payload = payload.strip_suffix(';').unwrap_or(payload).trim_end();
    Ok((Some(name), payload))
}

/// Reject variable names the parser would not read back.
pub fn check_var_name(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(Error::Syntax(format!("Invalid variable name '{name}'")))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Render in Documenter's layout: one record array between the wrapper lines.
pub fn to_js(index: &SearchIndex) -> Result<String> {
    check_var_name(&index.var_name)?;
    let mut out = format!("var {} = {{\"{DOCS_KEY}\":\n[", index.var_name);
    for (i, record) in index.records.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::to_string(record)?);
    }
    out.push_str("]\n}\n");
    Ok(out)
}

/// Render as a JSON object with a `docs` array.
pub fn to_json(index: &SearchIndex, pretty: bool) -> Result<String> {
    let wrapper = Wrapper {
        docs: &index.records,
    };
    let mut out = if pretty {
        serde_json::to_string_pretty(&wrapper)?
    } else {
        serde_json::to_string(&wrapper)?
    };
    out.push('\n');
    Ok(out)
}

/// Render in the requested format.
pub fn render(index: &SearchIndex, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Js => to_js(index),
        OutputFormat::Json => to_json(index, false),
        OutputFormat::JsonPretty => to_json(index, true),
    }
}

/// SHA-256 of the records' compact JSON, hex encoded.
///
/// The variable name does not contribute, so the same records always hash
/// the same regardless of wrapper.
pub fn digest(index: &SearchIndex) -> Result<String> {
    let bytes = serde_json::to_vec(&index.records)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Read and parse an artifact from disk.
pub fn read_file(path: &Path, mode: ParseMode) -> Result<ParseOutcome> {
    let timer = Timer::start("read_index");
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    timer.lap(&format!("Read {} bytes from {}", contents.len(), path.display()));

    let outcome = parse(&contents, mode)?;
    tracing::debug!(
        "read_file: {} records, {} dropped from {}",
        outcome.index.len(),
        outcome.dropped.len(),
        path.display()
    );
    timer.finish();
    Ok(outcome)
}

/// Write an artifact, replacing any existing file in one step.
///
/// The content goes to a temporary file next to `path` first, which is then
/// renamed over the destination, so readers never observe a partial index.
pub fn write_file(path: &Path, index: &SearchIndex, format: OutputFormat) -> Result<()> {
    let rendered = render(index, format)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    tmp.write_all(rendered.as_bytes())
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    tracing::info!("Wrote {} records to {}", index.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use docindex_common::Category;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"var documenterSearchIndex = {"docs":
[{"location":"apireference/#Documentation","page":"API Reference","title":"Documentation","text":"","category":"section"},{"location":"apireference/#foo","page":"API Reference","title":"foo","text":"foo(x)\n\nDo foo.","category":"method"}]
}
"#;

    fn sample_index() -> SearchIndex {
        parse(SAMPLE, ParseMode::Strict).unwrap().index
    }

    #[test]
    fn test_parse_documenter_layout() {
        let outcome = parse(SAMPLE, ParseMode::Strict).unwrap();
        assert_eq!(outcome.index.var_name, "documenterSearchIndex");
        assert_eq!(outcome.index.len(), 2);
        assert!(outcome.dropped.is_empty());

        let method = &outcome.index.records[1];
        assert_eq!(method.category, Category::Method);
        assert_eq!(method.text, "foo(x)\n\nDo foo.");
    }

    #[test]
    fn test_parse_custom_name_and_semicolon() {
        let input = "const mySearch = [{\"location\":\"a/\",\"page\":\"A\",\"title\":\"A\",\"text\":\"\",\"category\":\"page\"}];\n";
        let outcome = parse(input, ParseMode::Strict).unwrap();
        assert_eq!(outcome.index.var_name, "mySearch");
        assert_eq!(outcome.index.len(), 1);
    }

    #[test]
    fn test_parse_plain_json_uses_default_name() {
        let input = r#"{"docs":[]}"#;
        let outcome = parse(input, ParseMode::Strict).unwrap();
        assert_eq!(outcome.index.var_name, DEFAULT_VAR_NAME);
        assert!(outcome.index.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse("window.index = []", ParseMode::Tolerant),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(
            parse("var 1x = []", ParseMode::Tolerant),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(
            parse(r#"{"pages": []}"#, ParseMode::Tolerant),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(
            parse(r#"{"docs": {}}"#, ParseMode::Tolerant),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(
            parse("var x = {\"docs\": [", ParseMode::Tolerant),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn test_strict_fails_on_malformed_record() {
        let input = r#"[{"location":"a/","page":"A","title":"A","text":"","category":"page"},{"location":"b/","page":"B","title":"B","category":"page"}]"#;
        let err = parse(input, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn test_tolerant_drops_malformed_records() {
        let input = r#"[
            {"location":"a/","page":"A","title":"A","text":"","category":"page"},
            {"location":"b/","page":"B","title":"B","category":"page"},
            {"location":"c/","page":"C","title":"C","text":"","category":"widget"},
            42,
            {"location":"d/","page":"D","title":"D","text":3,"category":"page"},
            {"location":"e/#x","page":"E","title":"x","text":"doc","category":"method"}
        ]"#;
        let outcome = parse(input, ParseMode::Tolerant).unwrap();
        assert_eq!(outcome.index.len(), 2);
        let positions: Vec<usize> = outcome.dropped.iter().map(|d| d.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(outcome.positions, vec![0, 5]);
        assert!(outcome.dropped[1].reason.contains("widget"));
    }

    #[test]
    fn test_to_js_matches_documenter_layout() {
        let index = sample_index();
        assert_eq!(to_js(&index).unwrap(), SAMPLE);
    }

    #[test]
    fn test_to_js_rejects_unreadable_var_name() {
        for name in ["my-index", "", "1st", "a b"] {
            let index = SearchIndex::new(Vec::new()).with_var_name(name);
            assert!(matches!(to_js(&index), Err(Error::Syntax(_))), "{name:?}");
        }
        let index = SearchIndex::new(Vec::new()).with_var_name("$index_2");
        let js = to_js(&index).unwrap();
        assert_eq!(parse(&js, ParseMode::Strict).unwrap().index, index);
    }

    #[test]
    fn test_write_file_rejects_unreadable_var_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("search_index.js");
        let index = SearchIndex::new(Vec::new()).with_var_name("my-index");
        assert!(write_file(&path, &index, OutputFormat::Js).is_err());
        assert!(!path.exists());
        assert!(write_file(&path, &index, OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_roundtrip_js_and_json() {
        let index = sample_index();

        let js = to_js(&index).unwrap();
        assert_eq!(parse(&js, ParseMode::Strict).unwrap().index, index);

        for pretty in [false, true] {
            let json = to_json(&index, pretty).unwrap();
            let reparsed = parse(&json, ParseMode::Strict).unwrap().index;
            assert_eq!(reparsed.records, index.records);
        }
    }

    #[test]
    fn test_digest_ignores_var_name() {
        let index = sample_index();
        let renamed = index.clone().with_var_name("other");
        assert_eq!(digest(&index).unwrap(), digest(&renamed).unwrap());
        assert_eq!(digest(&index).unwrap().len(), 64);

        let mut changed = index.clone();
        changed.records[0].title.push('!');
        assert_ne!(digest(&index).unwrap(), digest(&changed).unwrap());
    }

    #[test]
    fn test_write_file_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("search_index.js");

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();

        let index = sample_index();
        write_file(&path, &index, OutputFormat::Js).unwrap();

        let outcome = read_file(&path, ParseMode::Strict).unwrap();
        assert_eq!(outcome.index, index);

        // Only the destination remains, no temp files left behind
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_read_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_file(&temp_dir.path().join("nope.js"), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
