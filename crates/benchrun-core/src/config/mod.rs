//! Orchestrator settings: where runs live, defaults for sampling and
//! telemetry, the known benchmark names, and the external collaborator
//! commands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RunError;

/// Post-processing flavor handed to the per-sample tool. `Html` keeps the
/// final sample of each iteration in the foreground behind a global join;
/// `Cdm` lets every sample run as a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostprocessMode {
    Html,
    Cdm,
}

impl PostprocessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostprocessMode::Html => "html",
            PostprocessMode::Cdm => "cdm",
        }
    }
}

impl fmt::Display for PostprocessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostprocessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(PostprocessMode::Html),
            "cdm" => Ok(PostprocessMode::Cdm),
            other => Err(format!("unknown post-process mode `{other}` (expected html or cdm)")),
        }
    }
}

/// External collaborator commands, resolved through `PATH` unless given as
/// absolute paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// Parameter-expansion tool (parameter set in, iteration lines out).
    pub iterations: String,
    /// Per-sample execution tool.
    pub sample: String,
    /// Telemetry lifecycle tool (start/stop/interrupt).
    pub toolctl: String,
    /// Remote configuration harvesting tool.
    pub collect_config: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            iterations: "benchrun-iterations".into(),
            sample: "benchrun-sample".into(),
            toolctl: "benchrun-toolctl".into(),
            collect_config: "benchrun-collect-config".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory live runs are created under.
    pub run_dir: PathBuf,
    /// Default samples per iteration; `--samples=N` inside a parameter set
    /// overrides it for that set.
    pub samples: usize,
    /// Default tool group activated for the run.
    pub tool_group: String,
    /// Default system-information collection mode.
    pub sysinfo: String,
    /// Default post-processing flavor.
    pub postprocess_mode: PostprocessMode,
    /// Benchmark names this installation may run; also the `list` output.
    pub benchmarks: Vec<String>,
    pub tools: Tools,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from("/var/tmp/benchrun"),
            samples: 1,
            tool_group: "default".into(),
            sysinfo: "default".into(),
            postprocess_mode: PostprocessMode::Html,
            benchmarks: vec!["fio".into(), "uperf".into(), "linpack".into()],
            tools: Tools::default(),
        }
    }
}

impl Config {
    /// Loads settings from a YAML file. Unknown keys are ignored; missing
    /// keys fall back to the defaults above.
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RunError::Config(format!("cannot read settings file {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            RunError::Config(format!("invalid settings file {}: {e}", path.display()))
        })
    }

    /// True when `name` is one of the configured benchmarks.
    pub fn knows_benchmark(&self, name: &str) -> bool {
        self.benchmarks.iter().any(|b| b == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let cfg = Config::default();
        assert_eq!(cfg.samples, 1);
        assert_eq!(cfg.postprocess_mode, PostprocessMode::Html);
        assert!(cfg.knows_benchmark("fio"));
        assert!(!cfg.knows_benchmark("nosuch"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "samples: 3\nbenchmarks: [iozone]").unwrap();
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.samples, 3);
        assert_eq!(cfg.benchmarks, vec!["iozone".to_string()]);
        assert_eq!(cfg.tool_group, "default");
        assert_eq!(cfg.tools.iterations, "benchrun-iterations");
    }

    #[test]
    fn tools_override() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "tools:\n  iterations: /opt/bin/expand").unwrap();
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.tools.iterations, "/opt/bin/expand");
        assert_eq!(cfg.tools.sample, "benchrun-sample");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/benchrun.yaml")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "samples: [not a number").unwrap();
        let err = Config::load(f.path()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn postprocess_mode_parses() {
        assert_eq!("html".parse::<PostprocessMode>().unwrap(), PostprocessMode::Html);
        assert_eq!("cdm".parse::<PostprocessMode>().unwrap(), PostprocessMode::Cdm);
        assert!("pdf".parse::<PostprocessMode>().is_err());
        assert_eq!(PostprocessMode::Cdm.to_string(), "cdm");
    }
}
