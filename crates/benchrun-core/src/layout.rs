//! On-disk shape of a run directory.
//!
//! ```text
//! <base>/                      # <benchmark>_<YYYY.MM.DDTHH.MM.SS>
//!   run.params                 # one line per parameter set
//!   iterations.lst             # one "<id>-<label>" line per iteration
//!   es/
//!     run/run-<part>.json
//!     bench/iteration-<id>.json
//!     config/<host>-<kind>.json
//!     metrics/                 # reserved for collectors
//!   <id>-<label>/sample<N>/sample.cmd
//! ```

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::params::ParameterSet;

pub const PARAMS_FILE: &str = "run.params";
pub const ITERATIONS_FILE: &str = "iterations.lst";
pub const SAMPLE_PREFIX: &str = "sample";
pub const SAMPLE_CMD_FILE: &str = "sample.cmd";

/// Timestamp fragment used in run directory names and telemetry begin calls.
pub fn run_date() -> String {
    Utc::now().format("%Y.%m.%dT%H.%M.%S").to_string()
}

/// Directory name for a live run.
pub fn run_dir_name(benchmark: &str, date: &str) -> String {
    format!("{benchmark}_{date}")
}

/// Name of one sample directory.
pub fn sample_dir_name(index: usize) -> String {
    format!("{SAMPLE_PREFIX}{index}")
}

/// Parses a `sample<N>` directory name back into its index.
pub fn parse_sample_dir(name: &str) -> Option<usize> {
    name.strip_prefix(SAMPLE_PREFIX)?.parse().ok()
}

/// Paths within one run directory.
#[derive(Debug, Clone)]
pub struct RunLayout {
    base: PathBuf,
}

impl RunLayout {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Creates the base directory and the `es/` tree.
    pub fn create(&self) -> io::Result<()> {
        for sub in ["run", "bench", "config", "metrics"] {
            std::fs::create_dir_all(self.base.join("es").join(sub))?;
        }
        Ok(())
    }

    pub fn es_dir(&self) -> PathBuf {
        self.base.join("es")
    }

    pub fn run_doc_path(&self, part: u32) -> PathBuf {
        self.base.join("es/run").join(format!("run-{part}.json"))
    }

    pub fn iteration_doc_path(&self, id: u64) -> PathBuf {
        self.base
            .join("es/bench")
            .join(format!("iteration-{id}.json"))
    }

    pub fn config_doc_path(&self, host: &str, kind: &str) -> PathBuf {
        self.base.join("es/config").join(format!(
            "{}-{}.json",
            safe_component(host),
            safe_component(kind)
        ))
    }

    pub fn iteration_dir(&self, dir_name: &str) -> PathBuf {
        self.base.join(dir_name)
    }

    pub fn sample_dir(&self, iteration_dir_name: &str, index: usize) -> PathBuf {
        self.iteration_dir(iteration_dir_name)
            .join(sample_dir_name(index))
    }

    pub fn params_path(&self) -> PathBuf {
        self.base.join(PARAMS_FILE)
    }

    pub fn iterations_path(&self) -> PathBuf {
        self.base.join(ITERATIONS_FILE)
    }

    /// Records the original parameter sets, one line per set, with any
    /// consumed `--samples=N` override reconstructed at the end of its line.
    pub fn write_params(&self, sets: &[ParameterSet]) -> io::Result<()> {
        let mut out = String::new();
        for set in sets {
            let mut line = set.params.join(" ");
            if let Some(n) = set.samples {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&format!("--samples={n}"));
            }
            out.push_str(&line);
            out.push('\n');
        }
        std::fs::write(self.params_path(), out)
    }

    /// Writes the iteration list, one `<id>-<label>` line per iteration.
    pub fn write_iterations(&self, dir_names: &[String]) -> io::Result<()> {
        let mut out = String::new();
        for name in dir_names {
            out.push_str(name);
            out.push('\n');
        }
        std::fs::write(self.iterations_path(), out)
    }

    /// Reads the iteration list back, skipping blank lines.
    pub fn read_iterations(&self) -> io::Result<Vec<String>> {
        let raw = std::fs::read_to_string(self.iterations_path())?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

/// Folds path separators and whitespace out of a value used as a file-name
/// component.
fn safe_component(s: &str) -> String {
    s.chars()
        .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Enumerates `sample<N>` directories under one iteration directory, sorted
/// by index.
pub fn scan_sample_dirs(iteration_dir: &Path) -> io::Result<Vec<(usize, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(iteration_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(index) = parse_sample_dir(name) {
            found.push((index, entry.path()));
        }
    }
    found.sort_by_key(|(index, _)| *index);
    Ok(found)
}
