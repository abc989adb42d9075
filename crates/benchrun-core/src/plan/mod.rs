//! Turns raw CLI parameters into the ordered parameter-set → iteration →
//! sample structure, and recovers that structure from disk in replay mode.

use std::path::PathBuf;

use crate::errors::RunError;
use crate::layout::{self, RunLayout};
use crate::params::{common_tokens, label_for, tokenize, ParameterSet};
use crate::services::ExpansionService;

/// One concrete parameter combination to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
    /// Global id, monotonic across every parameter set of the run.
    pub id: u64,
    pub label: String,
    pub params: Vec<String>,
    pub sample_count: usize,
}

impl Iteration {
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.id, self.label)
    }

    /// True for the highest-indexed sample of this iteration.
    pub fn is_last_sample(&self, index: usize) -> bool {
        index + 1 == self.sample_count
    }
}

/// The iterations produced by one parameter set.
#[derive(Debug, Clone)]
pub struct PlannedPart {
    pub part: u32,
    pub set: ParameterSet,
    pub comments: Vec<String>,
    pub iterations: Vec<Iteration>,
}

/// The full plan for one invocation.
#[derive(Debug, Clone)]
pub struct Plan {
    pub benchmark: String,
    pub parts: Vec<PlannedPart>,
}

impl Plan {
    pub fn iterations(&self) -> impl Iterator<Item = &Iteration> {
        self.parts.iter().flat_map(|p| p.iterations.iter())
    }

    pub fn iteration_count(&self) -> usize {
        self.parts.iter().map(|p| p.iterations.len()).sum()
    }

    pub fn sample_count(&self) -> usize {
        self.iterations().map(|it| it.sample_count).sum()
    }

    /// `<id>-<label>` for every iteration, in plan order.
    pub fn dir_names(&self) -> Vec<String> {
        self.iterations().map(Iteration::dir_name).collect()
    }
}

/// Owns the global iteration-id counter for one invocation. Ids are handed
/// out in emission order and continue across parameter sets; the counter is
/// never reset or shared.
pub struct PlanBuilder {
    next_id: u64,
    default_samples: usize,
}

impl PlanBuilder {
    pub fn new(default_samples: usize) -> Self {
        Self {
            next_id: 0,
            default_samples,
        }
    }

    /// Expands every parameter set and assigns iteration identities.
    ///
    /// Planning is pure: nothing touches the filesystem here, so an
    /// expansion failure on any set leaves no artifacts behind.
    pub async fn build(
        &mut self,
        benchmark: &str,
        sets: &[ParameterSet],
        expander: &dyn ExpansionService,
    ) -> Result<Plan, RunError> {
        // One fully-defaulted line per set drives cross-set commonality.
        let mut defaults_lines: Vec<Vec<String>> = Vec::with_capacity(sets.len());
        for (part, set) in sets.iter().enumerate() {
            let out = expander
                .defaults(benchmark, &set.params)
                .await
                .map_err(|e| RunError::Expansion {
                    part,
                    detail: format!("{e:#}"),
                })?;
            let line = out.lines.first().map(String::as_str).unwrap_or("");
            defaults_lines.push(tokenize(line));
        }
        let run_common = common_tokens(&defaults_lines);

        let mut parts = Vec::with_capacity(sets.len());
        for (part, set) in sets.iter().enumerate() {
            let out = expander
                .expand(benchmark, &set.params)
                .await
                .map_err(|e| RunError::Expansion {
                    part,
                    detail: format!("{e:#}"),
                })?;

            let token_lines: Vec<Vec<String>> = out.lines.iter().map(|l| tokenize(l)).collect();
            let set_common = common_tokens(&token_lines);
            let sample_count = set.samples.unwrap_or(self.default_samples);

            let mut iterations = Vec::with_capacity(token_lines.len());
            for tokens in token_lines {
                let label = label_for(&tokens, &set_common, &run_common, benchmark);
                iterations.push(Iteration {
                    id: self.next_id,
                    label,
                    params: tokens,
                    sample_count,
                });
                self.next_id += 1;
            }
            parts.push(PlannedPart {
                part: part as u32,
                set: set.clone(),
                comments: out.comments,
                iterations,
            });
        }

        Ok(Plan {
            benchmark: benchmark.to_string(),
            parts,
        })
    }
}

/// An iteration recovered from an existing run directory.
#[derive(Debug, Clone)]
pub struct RecoveredIteration {
    pub id: u64,
    pub label: String,
    pub dir: PathBuf,
    /// `(index, path)` per sample directory, sorted by index. Never empty.
    pub samples: Vec<(usize, PathBuf)>,
}

impl RecoveredIteration {
    /// Index of the numerically-last sample directory.
    pub fn last_index(&self) -> usize {
        self.samples.last().map(|(i, _)| *i).unwrap_or(0)
    }
}

/// Rebuilds iteration and sample identities from an executed run's
/// directory layout. Ids and labels come from the iteration list file;
/// sample indexes come from the `sample<N>` directory names on disk —
/// nothing is regenerated. Iterations without any sample directory are
/// skipped with a warning.
pub fn recover(layout: &RunLayout) -> Result<Vec<RecoveredIteration>, RunError> {
    let names = layout.read_iterations().map_err(|e| {
        RunError::Config(format!(
            "cannot read {} in {}: {e}",
            layout::ITERATIONS_FILE,
            layout.base().display()
        ))
    })?;

    let mut recovered = Vec::with_capacity(names.len());
    for name in names {
        let parsed = name
            .split_once('-')
            .and_then(|(id, label)| id.parse::<u64>().ok().map(|id| (id, label.to_string())));
        let Some((id, label)) = parsed else {
            return Err(RunError::Config(format!(
                "malformed iteration list entry `{name}`"
            )));
        };

        let dir = layout.iteration_dir(&name);
        if !dir.is_dir() {
            return Err(RunError::Config(format!(
                "iteration directory {} is missing",
                dir.display()
            )));
        }

        let samples = layout::scan_sample_dirs(&dir)?;
        if samples.is_empty() {
            tracing::warn!("no sample directories under {}; skipping", dir.display());
            continue;
        }
        recovered.push(RecoveredIteration {
            id,
            label,
            dir,
            samples,
        });
    }
    Ok(recovered)
}
