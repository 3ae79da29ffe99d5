//! Canonical forms for drift detection.
//!
//! Devices are free to reformat the documents they echo back: reorder keys,
//! pretty-print, strip whitespace. Drift is therefore decided on a canonical
//! rendering (compact JSON, object keys sorted at every depth, array order
//! kept) and never on the raw text.
//!
//! Numbers keep the exact token the document used (`serde_json` is built with
//! `arbitrary_precision`), so 64-bit overflow and long decimal64 values are
//! neither rounded nor collapsed into one another.

use std::fmt;

use serde_json::Value;

use crate::error::CoreError;

/// Rendering of the empty document.
const EMPTY_OBJECT: &str = "{}";

/// Order-independent rendering of a JSON document, used only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a JSON-text document.
///
/// Empty or whitespace-only text is the empty document and canonicalizes to
/// `{}`. Anything else must parse as JSON.
pub fn canonicalize(text: &str) -> Result<CanonicalForm, CoreError> {
    if text.trim().is_empty() {
        return Ok(CanonicalForm(EMPTY_OBJECT.to_owned()));
    }

    let value: Value = serde_json::from_str(text)?;
    let rendered = serde_json::to_string(&sorted(value))?;
    Ok(CanonicalForm(rendered))
}

/// Whether two documents are equal for drift purposes.
pub fn documents_equal(a: &str, b: &str) -> Result<bool, CoreError> {
    Ok(canonicalize(a)? == canonicalize(b)?)
}

/// Rebuild `value` with object keys inserted in sorted order, so the
/// rendering is stable whether or not `serde_json` preserves insertion order.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        scalar => scalar,
    }
}
