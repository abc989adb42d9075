//! The JSON documents describing a run: one run document per parameter-set
//! part, one iteration document per iteration, one configuration document
//! per harvested host/config kind.

mod harvest;
mod iteration;
mod run;

pub use harvest::{config_documents, parse_config_stream, ConfigDocument, CONFIG_SCHEMA_VERSION};
pub use iteration::{IterationDocument, ITERATION_SCHEMA_VERSION};
pub use run::{RunAssembler, RunContext, RunDocument, UserMetadata, RUN_SCHEMA_VERSION};

use std::path::Path;

use serde::Serialize;

use crate::errors::RunError;

/// Writes a document as pretty-printed JSON with a trailing newline.
pub fn write_document<T: Serialize>(value: &T, path: &Path) -> Result<(), RunError> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}
