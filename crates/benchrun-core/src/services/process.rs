//! Production collaborator implementations. Each one spawns the configured
//! external command and maps a spawn failure or non-zero exit into an error
//! carrying the command name and status.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::process::Command;

use crate::config::Tools;

use super::{
    ConfigHarvester, ExpansionOutput, ExpansionService, SampleHook, SampleRunner, SampleSpec,
    TelemetryContext, TelemetryService,
};

fn describe_status(status: std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Runs to completion, capturing stdout; stderr is captured and folded into
/// the error on failure.
async fn checked_output(cmd: &mut Command, what: &str) -> anyhow::Result<String> {
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("cannot spawn {what}"))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            bail!("{what} {}", describe_status(out.status));
        }
        bail!("{what} {}: {stderr}", describe_status(out.status));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Runs to completion with stdout/stderr inherited, so tool output streams
/// to the console the way the workload's own logs expect.
async fn checked_status(cmd: &mut Command, what: &str) -> anyhow::Result<()> {
    let status = cmd
        .stdin(Stdio::null())
        .status()
        .await
        .with_context(|| format!("cannot spawn {what}"))?;
    if !status.success() {
        bail!("{what} {}", describe_status(status));
    }
    Ok(())
}

/// Parameter expansion through the configured `iterations` tool.
pub struct ProcessExpansion {
    command: String,
}

impl ProcessExpansion {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl ExpansionService for ProcessExpansion {
    async fn expand(&self, benchmark: &str, params: &[String]) -> anyhow::Result<ExpansionOutput> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(benchmark).args(params);
        let stdout = checked_output(&mut cmd, &self.command).await?;
        Ok(ExpansionOutput::parse(&stdout))
    }

    async fn defaults(
        &self,
        benchmark: &str,
        params: &[String],
    ) -> anyhow::Result<ExpansionOutput> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(benchmark).arg("--defaults-only").args(params);
        let stdout = checked_output(&mut cmd, &self.command).await?;
        Ok(ExpansionOutput::parse(&stdout))
    }
}

/// Per-sample execution through the configured `sample` tool.
pub struct ProcessSampleRunner {
    command: String,
}

impl ProcessSampleRunner {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl SampleRunner for ProcessSampleRunner {
    async fn run_sample(&self, spec: &SampleSpec) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("--iteration")
            .arg(&spec.iteration_doc)
            .arg("--sample-dir")
            .arg(&spec.sample_dir)
            .arg("--run-dir")
            .arg(&spec.run_dir)
            .arg("--group")
            .arg(&spec.tool_group)
            .arg("--mode")
            .arg(spec.mode.as_str());
        if spec.is_last {
            cmd.arg("--last");
        }
        if spec.replay {
            cmd.arg("--replay");
        }
        checked_status(&mut cmd, &self.command).await
    }
}

/// Telemetry lifecycle through the configured `toolctl` tool.
pub struct ProcessTelemetry {
    command: String,
}

impl ProcessTelemetry {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl TelemetryService for ProcessTelemetry {
    async fn begin(&self, ctx: &TelemetryContext) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("start")
            .arg("--dir")
            .arg(&ctx.run_dir)
            .arg("--benchmark")
            .arg(&ctx.benchmark)
            .arg("--date")
            .arg(&ctx.date)
            .arg("--sysinfo")
            .arg(&ctx.sysinfo)
            .arg("--group")
            .arg(&ctx.tool_group);
        if let Some(tags) = &ctx.tags {
            cmd.arg("--tags").arg(tags);
        }
        checked_status(&mut cmd, &self.command).await
    }

    async fn end(&self, sysinfo: &str, tool_group: &str) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("stop")
            .arg("--sysinfo")
            .arg(sysinfo)
            .arg("--group")
            .arg(tool_group);
        checked_status(&mut cmd, &self.command).await
    }

    async fn interrupt(&self, tool_group: &str) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("interrupt").arg("--group").arg(tool_group);
        checked_status(&mut cmd, &self.command).await
    }
}

/// Remote configuration harvesting through the configured tool; hosts are
/// passed as arguments and concatenated JSON comes back on stdout.
pub struct ProcessHarvester {
    command: String,
}

impl ProcessHarvester {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl ConfigHarvester for ProcessHarvester {
    async fn collect(&self, hosts: &[String]) -> anyhow::Result<String> {
        let mut cmd = Command::new(&self.command);
        cmd.args(hosts);
        checked_output(&mut cmd, &self.command).await
    }
}

/// Pre-sample hook: the user command runs through `sh -c` with the sample
/// directory exported as `BENCHRUN_SAMPLE_DIR`.
pub struct ShellHook {
    command: String,
}

impl ShellHook {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl SampleHook for ShellHook {
    async fn run(&self, sample_dir: &Path) -> anyhow::Result<()> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .env("BENCHRUN_SAMPLE_DIR", sample_dir);
        checked_status(&mut cmd, "pre-sample hook").await
    }
}

/// The full production collaborator set, wired from the configured tools.
pub struct ProcessServices {
    pub expansion: Arc<dyn ExpansionService>,
    pub samples: Arc<dyn SampleRunner>,
    pub telemetry: Arc<dyn TelemetryService>,
    pub harvester: Arc<dyn ConfigHarvester>,
}

impl ProcessServices {
    pub fn new(tools: &Tools) -> Self {
        Self {
            expansion: Arc::new(ProcessExpansion::new(&tools.iterations)),
            samples: Arc::new(ProcessSampleRunner::new(&tools.sample)),
            telemetry: Arc::new(ProcessTelemetry::new(&tools.toolctl)),
            harvester: Arc::new(ProcessHarvester::new(&tools.collect_config)),
        }
    }
}
