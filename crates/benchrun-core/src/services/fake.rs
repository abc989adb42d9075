//! In-process collaborator fakes for engine and planner tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

use super::{
    ConfigHarvester, ExpansionOutput, ExpansionService, SampleHook, SampleRunner, SampleSpec,
    TelemetryContext, TelemetryService,
};

/// Expansion fake fed with scripted responses, consumed in call order.
#[derive(Default)]
pub struct ScriptedExpansion {
    expand: Mutex<VecDeque<anyhow::Result<ExpansionOutput>>>,
    defaults: Mutex<VecDeque<anyhow::Result<ExpansionOutput>>>,
}

impl ScriptedExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_expand(&self, stdout: &str) {
        self.expand
            .lock()
            .unwrap()
            .push_back(Ok(ExpansionOutput::parse(stdout)));
    }

    pub fn push_expand_err(&self, msg: &str) {
        self.expand
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!("{msg}")));
    }

    pub fn push_defaults(&self, stdout: &str) {
        self.defaults
            .lock()
            .unwrap()
            .push_back(Ok(ExpansionOutput::parse(stdout)));
    }

    pub fn push_defaults_err(&self, msg: &str) {
        self.defaults
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!("{msg}")));
    }
}

#[async_trait]
impl ExpansionService for ScriptedExpansion {
    async fn expand(&self, _benchmark: &str, _params: &[String]) -> anyhow::Result<ExpansionOutput> {
        self.expand
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected expand call")
    }

    async fn defaults(
        &self,
        _benchmark: &str,
        _params: &[String],
    ) -> anyhow::Result<ExpansionOutput> {
        self.defaults
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected defaults call")
    }
}

/// Sample runner that records `start`/`end` events instead of running
/// anything. `fail_on` aborts the n-th call (0-based) at its start event;
/// `delay_ms` simulates work so background overlap is observable.
#[derive(Default)]
pub struct RecordingRunner {
    events: Mutex<Vec<String>>,
    calls: AtomicUsize,
    pub fail_on: Option<usize>,
    pub delay_ms: u64,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    pub fn with_delay(ms: u64) -> Self {
        Self {
            delay_ms: ms,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tag(spec: &SampleSpec) -> String {
        let sample = spec
            .sample_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("?");
        let iteration = spec
            .sample_dir
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("?");
        format!("{iteration}/{sample}")
    }
}

#[async_trait]
impl SampleRunner for RecordingRunner {
    async fn run_sample(&self, spec: &SampleSpec) -> anyhow::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let tag = Self::tag(spec);
        self.events.lock().unwrap().push(format!(
            "start {tag} last={} replay={}",
            spec.is_last, spec.replay
        ));
        if self.fail_on == Some(call) {
            bail!("scripted sample failure");
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.events.lock().unwrap().push(format!("end {tag}"));
        Ok(())
    }
}

/// Telemetry fake counting lifecycle calls.
#[derive(Default)]
pub struct FakeTelemetry {
    pub begins: AtomicUsize,
    pub ends: AtomicUsize,
    pub interrupts: AtomicUsize,
    pub fail_begin: bool,
}

impl FakeTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TelemetryService for FakeTelemetry {
    async fn begin(&self, _ctx: &TelemetryContext) -> anyhow::Result<()> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        if self.fail_begin {
            bail!("tool start refused");
        }
        Ok(())
    }

    async fn end(&self, _sysinfo: &str, _tool_group: &str) -> anyhow::Result<()> {
        self.ends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn interrupt(&self, _tool_group: &str) -> anyhow::Result<()> {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Harvester fake returning a canned stdout blob.
#[derive(Default)]
pub struct FakeHarvester {
    pub raw: String,
    pub fail: bool,
}

impl FakeHarvester {
    pub fn with_output(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            fail: false,
        }
    }
}

#[async_trait]
impl ConfigHarvester for FakeHarvester {
    async fn collect(&self, _hosts: &[String]) -> anyhow::Result<String> {
        if self.fail {
            bail!("collection tool unreachable");
        }
        Ok(self.raw.clone())
    }
}

/// Pre-sample hook fake.
#[derive(Default)]
pub struct ScriptedHook {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl ScriptedHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SampleHook for ScriptedHook {
    async fn run(&self, _sample_dir: &Path) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("scripted hook failure");
        }
        Ok(())
    }
}
