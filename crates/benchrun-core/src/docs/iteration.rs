use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::Iteration;

pub const ITERATION_SCHEMA_VERSION: u32 = 1;

/// Describes one iteration. Written before execution so the per-sample tool
/// can read the parameters from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IterationDocument {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub id: u64,
    pub label: String,
    pub benchmark: String,
    pub params: Vec<String>,
    pub sample_count: usize,
}

impl IterationDocument {
    pub fn new(run_id: Uuid, benchmark: &str, iteration: &Iteration) -> Self {
        Self {
            schema_version: ITERATION_SCHEMA_VERSION,
            run_id,
            id: iteration.id,
            label: iteration.label.clone(),
            benchmark: benchmark.to_string(),
            params: iteration.params.clone(),
            sample_count: iteration.sample_count,
        }
    }
}
