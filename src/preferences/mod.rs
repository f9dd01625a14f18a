//! Flat JSON preferences document shared with the main logger.
//!
//! The logger creates `./fd_preferences.json` before the settings dialog is
//! ever opened and re-reads it after every save. Everything here preserves
//! that contract: one flat object, unknown keys kept, 4-space indented
//! output, no default document synthesized when the file is missing.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Preferences file shared with the main logger, relative to the working
/// directory.
pub const PREFERENCES_FILE: &str = "./fd_preferences.json";

/// The in-memory copy of the preferences document.
///
/// Values are booleans, strings, or integers keyed by flat string keys.
/// Keys this dialog does not know about pass through a load/save cycle
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    values: Map<String, Value>,
}

impl Document {
    /// Read and parse the document. A missing file, malformed JSON, or a
    /// non-object top level is an error for the caller; the dialog does not
    /// open without a valid document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading preferences file {}", path.display()))?;
        let parsed: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing preferences file {}", path.display()))?;
        let Value::Object(values) = parsed else {
            bail!("preferences file {} is not a JSON object", path.display());
        };
        let document = Self { values };
        debug!("reading: {}", document.dump());
        Ok(document)
    }

    /// Overwrite `path` with the full mapping, pretty-printed with 4-space
    /// indentation. Direct truncate-and-write; not atomic.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut out = Vec::with_capacity(4096);
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        self.values
            .serialize(&mut serializer)
            .context("serializing preferences")?;
        fs::write(path, &out)
            .with_context(|| format!("writing preferences file {}", path.display()))?;
        debug!("writing: {}", self.dump());
        Ok(())
    }

    /// Compact single-line rendering for the log.
    pub fn dump(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value for a key, if present.
    #[allow(dead_code)]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Checkbox-backed keys: missing or falsy reads as unchecked.
    pub fn flag(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(truthy)
    }

    /// String keys: missing, null, or otherwise falsy reads as empty.
    pub fn text(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => String::new(),
        }
    }

    /// Keys stored as numbers but edited as text. A stored string passes
    /// through unchanged, a number renders via string conversion, and
    /// anything falsy renders empty.
    pub fn numeric_text(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(value) if truthy(value) => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            _ => String::new(),
        }
    }

    /// CW keying backend decoded from the `cwtype` integer. Anything that
    /// is not exactly 1 or 2 reads as no backend.
    pub fn cw_backend(&self) -> CwBackend {
        self.values
            .get("cwtype")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_owned(), Value::Bool(value));
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_owned(), Value::String(value.to_owned()));
    }

    pub fn set_integer(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_owned(), Value::from(value));
    }

    pub fn set_cw_backend(&mut self, backend: CwBackend) {
        self.set_integer("cwtype", backend.code());
    }

    /// Test-only constructor bypassing the filesystem.
    #[cfg(test)]
    pub(crate) fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            other => panic!("test document must be an object, got {other}"),
        }
    }
}

/// Python-style truthiness, matching how the logger family of tools treats
/// preference values: null, false, zero, and empty containers are falsy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Callsign lookup service the logger should query.
///
/// The document stores three independent flags (`useqrz`, `usehamdb`,
/// `usehamqth`); their exclusivity is a widget-grouping convention, not a
/// storage guarantee. Decoding picks the first set flag in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Qrz,
    HamDb,
    HamQth,
}

impl LookupSource {
    pub fn from_document(document: &Document) -> Option<Self> {
        if document.flag("useqrz") {
            Some(Self::Qrz)
        } else if document.flag("usehamdb") {
            Some(Self::HamDb)
        } else if document.flag("usehamqth") {
            Some(Self::HamQth)
        } else {
            None
        }
    }
}

/// External CW keying backend, stored as the integer `cwtype`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum CwBackend {
    #[default]
    None,
    CwDaemon,
    PyWinKeyer,
}

impl CwBackend {
    /// Collapse the two radio states to a backend. PyWinKeyer is evaluated
    /// last and wins if both radios are somehow checked.
    pub fn from_radios(cwdaemon: bool, pywinkeyer: bool) -> Self {
        let mut backend = Self::None;
        if cwdaemon {
            backend = Self::CwDaemon;
        }
        if pywinkeyer {
            backend = Self::PyWinKeyer;
        }
        backend
    }

    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::CwDaemon => 1,
            Self::PyWinKeyer => 2,
        }
    }
}

impl From<i64> for CwBackend {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::CwDaemon,
            2 => Self::PyWinKeyer,
            _ => Self::None,
        }
    }
}

impl From<CwBackend> for i64 {
    fn from(backend: CwBackend) -> Self {
        backend.code()
    }
}
