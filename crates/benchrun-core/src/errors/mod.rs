use thiserror::Error;

/// Fatal conditions the orchestrator can hit.
///
/// Replay-mode sample failures never surface here; they are logged by the
/// coordinator and deliberately do not alter the run's reported status.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("iteration expansion failed for parameter set {part}: {detail}")]
    Expansion { part: usize, detail: String },

    #[error("sample {sample} of iteration {iteration} failed: {detail}")]
    Sample {
        iteration: u64,
        sample: usize,
        detail: String,
    },

    #[error("tool lifecycle failed: {0}")]
    Telemetry(String),

    #[error("run interrupted")]
    Interrupted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunError {
    /// True for errors caused by how the run was requested rather than by
    /// anything that happened while executing it.
    pub fn is_config(&self) -> bool {
        matches!(self, RunError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_identity() {
        let e = RunError::Sample {
            iteration: 3,
            sample: 1,
            detail: "exit code 2".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("iteration 3"));
        assert!(msg.contains("sample 1"));
        assert!(msg.contains("exit code 2"));
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(RunError::Config("no clients".into()).is_config());
        assert!(!RunError::Interrupted.is_config());
        assert!(!RunError::Expansion {
            part: 0,
            detail: "exit 2".into()
        }
        .is_config());
    }
}
