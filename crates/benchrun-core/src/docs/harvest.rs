//! Conversion of harvested host-configuration data into documents.
//!
//! The collection tool prints concatenated JSON objects, back to back, with
//! no framing between them. They are read with a streaming parser that
//! yields one value at a time; nothing here guesses at object boundaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::run::RunDocument;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// One harvested host-configuration object, wrapped with run identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub benchmark: String,
    pub date: String,
    pub host: String,
    pub kind: String,
    /// The harvested object, verbatim.
    pub config: Value,
}

/// Splits concatenated JSON into its values with a streaming parser.
///
/// Returns the values read and, when the stream ends on a syntax error, the
/// error text. Values before the error are kept; bytes after it are not
/// recoverable, so the stream ends there.
pub fn parse_config_stream(raw: &str) -> (Vec<Value>, Option<String>) {
    let mut values = Vec::new();
    for item in serde_json::Deserializer::from_str(raw).into_iter::<Value>() {
        match item {
            Ok(v) => values.push(v),
            Err(e) => return (values, Some(e.to_string())),
        }
    }
    (values, None)
}

/// Wraps harvested values into configuration documents, reusing the run
/// metadata from the part document instead of regenerating identity.
///
/// A value that is not an object or lacks string `host`/`kind` fields is
/// counted as skipped; the caller logs those. Returns the documents and the
/// skip count.
pub fn config_documents(run: &RunDocument, values: Vec<Value>) -> (Vec<ConfigDocument>, usize) {
    let mut docs = Vec::new();
    let mut skipped = 0usize;
    for value in values {
        let host = value.get("host").and_then(Value::as_str).map(str::to_owned);
        let kind = value.get("kind").and_then(Value::as_str).map(str::to_owned);
        match (host, kind) {
            (Some(host), Some(kind)) => docs.push(ConfigDocument {
                schema_version: CONFIG_SCHEMA_VERSION,
                run_id: run.run_id,
                benchmark: run.benchmark.clone(),
                date: run.date.clone(),
                host,
                kind,
                config: value,
            }),
            _ => skipped += 1,
        }
    }
    (docs, skipped)
}
