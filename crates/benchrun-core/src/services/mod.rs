//! The external collaborators the orchestrator drives, modeled as traits so
//! the engine can be exercised with in-process fakes. Production
//! implementations in [`process`] spawn the configured commands.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::PostprocessMode;

pub mod process;

#[cfg(test)]
pub mod fake;

/// Output of one expansion-tool invocation: iteration parameter lines plus
/// any `#`-prefixed comment lines, in stdout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionOutput {
    pub lines: Vec<String>,
    pub comments: Vec<String>,
}

impl ExpansionOutput {
    /// Splits raw tool stdout: blank lines are dropped, `#` lines are
    /// comments, everything else is an iteration parameter line.
    pub fn parse(stdout: &str) -> Self {
        let mut out = ExpansionOutput::default();
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                out.comments.push(line.to_string());
            } else {
                out.lines.push(line.to_string());
            }
        }
        out
    }
}

/// Parameter-expansion tool. A failure (spawn error or non-zero exit) is
/// fatal for the whole run.
#[async_trait]
pub trait ExpansionService: Send + Sync {
    /// Expands one parameter set into iteration parameter lines.
    async fn expand(&self, benchmark: &str, params: &[String]) -> anyhow::Result<ExpansionOutput>;

    /// Defaults-only variant: one fully-defaulted parameter line for the
    /// set, used for cross-set commonality analysis.
    async fn defaults(&self, benchmark: &str, params: &[String])
        -> anyhow::Result<ExpansionOutput>;
}

/// Everything the per-sample tool needs to know about one sample execution.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    /// Path of the iteration document describing the parameters.
    pub iteration_doc: PathBuf,
    /// Directory the sample writes its results into.
    pub sample_dir: PathBuf,
    /// Base directory of the whole run.
    pub run_dir: PathBuf,
    pub tool_group: String,
    /// True for the highest-indexed sample of its iteration.
    pub is_last: bool,
    pub mode: PostprocessMode,
    /// True when re-processing an already-executed run.
    pub replay: bool,
}

/// Per-sample execution tool. `Err` means the sample failed (non-zero exit
/// or spawn failure); how fatal that is depends on the execution mode.
#[async_trait]
pub trait SampleRunner: Send + Sync {
    async fn run_sample(&self, spec: &SampleSpec) -> anyhow::Result<()>;
}

/// Arguments for starting telemetry collection.
#[derive(Debug, Clone)]
pub struct TelemetryContext {
    pub run_dir: PathBuf,
    pub benchmark: String,
    pub tags: Option<String>,
    pub date: String,
    pub sysinfo: String,
    pub tool_group: String,
}

/// Telemetry lifecycle tool. `begin` failure is fatal; `end` and
/// `interrupt` failures are logged by the caller and swallowed.
#[async_trait]
pub trait TelemetryService: Send + Sync {
    async fn begin(&self, ctx: &TelemetryContext) -> anyhow::Result<()>;
    async fn end(&self, sysinfo: &str, tool_group: &str) -> anyhow::Result<()>;
    async fn interrupt(&self, tool_group: &str) -> anyhow::Result<()>;
}

/// Remote configuration harvesting tool: returns concatenated JSON objects
/// describing host configuration, one object per host/config kind.
#[async_trait]
pub trait ConfigHarvester: Send + Sync {
    async fn collect(&self, hosts: &[String]) -> anyhow::Result<String>;
}

/// Hook run before every sample in live mode; a failure aborts the run.
#[async_trait]
pub trait SampleHook: Send + Sync {
    async fn run(&self, sample_dir: &std::path::Path) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_separates_comments_from_lines() {
        let out = ExpansionOutput::parse("# three iterations\n--bs=4k\n\n--bs=8k\n  --bs=16k  \n");
        assert_eq!(out.comments, vec!["# three iterations"]);
        assert_eq!(out.lines, vec!["--bs=4k", "--bs=8k", "--bs=16k"]);
    }

    #[test]
    fn parse_of_empty_stdout_is_empty() {
        let out = ExpansionOutput::parse("");
        assert!(out.lines.is_empty());
        assert!(out.comments.is_empty());
    }

    #[test]
    fn comment_marker_must_lead_the_line() {
        let out = ExpansionOutput::parse("--bs=4k # not a comment line");
        assert_eq!(out.lines, vec!["--bs=4k # not a comment line"]);
        assert!(out.comments.is_empty());
    }
}
