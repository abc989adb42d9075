//! Drives a planned run to completion.
//!
//! Live mode is strictly sequential and fail-fast: every parameter set is
//! expanded in memory first, then the layout and documents are persisted,
//! telemetry starts, and samples run one at a time in plan order until done
//! or the first failure.
//!
//! Replay mode re-processes an executed run: all but the last sample of
//! each iteration run as background jobs, and a last sample only starts
//! after a join over every outstanding background job in the whole run —
//! one coarse barrier, not a per-iteration one. Background failures are
//! logged and never fail the run; the final-sample work depends on seeing
//! every earlier sample's completed state, not on their success.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::PostprocessMode;
use crate::docs::{self, IterationDocument, RunAssembler, RunContext};
use crate::errors::RunError;
use crate::layout::{self, RunLayout};
use crate::params::ParameterSet;
use crate::plan::{self, Plan, PlanBuilder, PlannedPart, RecoveredIteration};
use crate::services::{
    ConfigHarvester, ExpansionService, SampleHook, SampleRunner, SampleSpec, TelemetryContext,
    TelemetryService,
};

use super::InterruptFlag;

/// What a finished run looked like, for the console summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub run_dir: PathBuf,
    pub parts: usize,
    pub iterations: usize,
    pub samples: usize,
}

pub struct Coordinator {
    expansion: Arc<dyn ExpansionService>,
    samples: Arc<dyn SampleRunner>,
    telemetry: Arc<dyn TelemetryService>,
    harvester: Arc<dyn ConfigHarvester>,
    hook: Option<Arc<dyn SampleHook>>,
    mode: PostprocessMode,
}

impl Coordinator {
    pub fn new(
        expansion: Arc<dyn ExpansionService>,
        samples: Arc<dyn SampleRunner>,
        telemetry: Arc<dyn TelemetryService>,
        harvester: Arc<dyn ConfigHarvester>,
        mode: PostprocessMode,
    ) -> Self {
        Self {
            expansion,
            samples,
            telemetry,
            harvester,
            hook: None,
            mode,
        }
    }

    /// Adds a hook run before every sample in live mode.
    pub fn with_hook(mut self, hook: Arc<dyn SampleHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Runs a live benchmark: plan, persist, execute, document.
    pub async fn run_live(
        &self,
        ctx: RunContext,
        layout: &RunLayout,
        sets: &[ParameterSet],
        default_samples: usize,
        interrupt: InterruptFlag,
    ) -> Result<RunOutcome, RunError> {
        // Plan every set before anything is persisted: an expansion failure
        // must leave no artifacts behind.
        let mut builder = PlanBuilder::new(default_samples);
        let plan = builder
            .build(&ctx.benchmark, sets, self.expansion.as_ref())
            .await?;

        for part in &plan.parts {
            for comment in &part.comments {
                eprintln!("{comment}");
            }
        }

        layout.create()?;
        layout.write_params(sets)?;
        layout.write_iterations(&plan.dir_names())?;

        let begin = TelemetryContext {
            run_dir: layout.base().to_path_buf(),
            benchmark: ctx.benchmark.clone(),
            tags: ctx.user.tags.clone(),
            date: ctx.date.clone(),
            sysinfo: ctx.sysinfo.clone(),
            tool_group: ctx.tool_group.clone(),
        };
        let sysinfo = ctx.sysinfo.clone();
        let tool_group = ctx.tool_group.clone();
        let mut assembler = RunAssembler::new(ctx);

        self.telemetry
            .begin(&begin)
            .await
            .map_err(|e| RunError::Telemetry(format!("{e:#}")))?;

        let outcome = RunOutcome {
            run_dir: layout.base().to_path_buf(),
            parts: plan.parts.len(),
            iterations: plan.iteration_count(),
            samples: plan.sample_count(),
        };

        match self
            .execute_live(layout, &plan, &mut assembler, &interrupt)
            .await
        {
            Ok(()) => {
                if let Err(e) = self.telemetry.end(&sysinfo, &tool_group).await {
                    tracing::warn!("tool lifecycle stop failed: {e:#}");
                }
                self.harvest_configs(layout, &assembler).await;
                Ok(outcome)
            }
            Err(RunError::Interrupted) => {
                // Tell the telemetry subsystem collection is being cut
                // short; once, best-effort.
                if let Err(e) = self.telemetry.interrupt(&tool_group).await {
                    tracing::warn!("tool lifecycle interrupt failed: {e:#}");
                }
                Err(RunError::Interrupted)
            }
            Err(other) => {
                if let Err(e) = self.telemetry.end(&sysinfo, &tool_group).await {
                    tracing::warn!("tool lifecycle stop failed: {e:#}");
                }
                Err(other)
            }
        }
    }

    async fn execute_live(
        &self,
        layout: &RunLayout,
        plan: &Plan,
        assembler: &mut RunAssembler,
        interrupt: &InterruptFlag,
    ) -> Result<(), RunError> {
        let run_id = assembler.run_id();
        for part in &plan.parts {
            self.persist_part(layout, &plan.benchmark, run_id, part)?;

            let names: Vec<String> = part.iterations.iter().map(|it| it.dir_name()).collect();
            let doc = assembler.begin_part(names);
            docs::write_document(&doc, &layout.run_doc_path(doc.part))?;

            for it in &part.iterations {
                for index in 0..it.sample_count {
                    if interrupt.is_raised() {
                        return Err(RunError::Interrupted);
                    }
                    let sample_dir = layout.sample_dir(&it.dir_name(), index);
                    eprintln!(
                        "running iteration {} ({}) sample {}/{}",
                        it.id,
                        it.label,
                        index + 1,
                        it.sample_count
                    );
                    if let Some(hook) = &self.hook {
                        hook.run(&sample_dir).await.map_err(|e| RunError::Sample {
                            iteration: it.id,
                            sample: index,
                            detail: format!("pre-sample hook: {e:#}"),
                        })?;
                    }
                    let spec = SampleSpec {
                        iteration_doc: layout.iteration_doc_path(it.id),
                        sample_dir,
                        run_dir: layout.base().to_path_buf(),
                        tool_group: assembler.context().tool_group.clone(),
                        is_last: it.is_last_sample(index),
                        mode: self.mode,
                        replay: false,
                    };
                    self.samples
                        .run_sample(&spec)
                        .await
                        .map_err(|e| RunError::Sample {
                            iteration: it.id,
                            sample: index,
                            detail: format!("{e:#}"),
                        })?;
                }
            }

            let doc = assembler.finish_part(doc);
            docs::write_document(&doc, &layout.run_doc_path(doc.part))?;
        }
        Ok(())
    }

    /// Writes one part's iteration documents, directories, and per-sample
    /// command files before any of its samples run.
    fn persist_part(
        &self,
        layout: &RunLayout,
        benchmark: &str,
        run_id: Uuid,
        part: &PlannedPart,
    ) -> Result<(), RunError> {
        for it in &part.iterations {
            let doc = IterationDocument::new(run_id, benchmark, it);
            docs::write_document(&doc, &layout.iteration_doc_path(it.id))?;
            for index in 0..it.sample_count {
                let sample_dir = layout.sample_dir(&it.dir_name(), index);
                std::fs::create_dir_all(&sample_dir)?;
                let cmd = format!("{} {}\n", benchmark, it.params.join(" "));
                std::fs::write(sample_dir.join(layout::SAMPLE_CMD_FILE), cmd)?;
            }
        }
        Ok(())
    }

    /// Converts harvested configuration data into documents, one per
    /// discovered object, reusing the last run document's metadata. Every
    /// failure here is logged, never fatal.
    async fn harvest_configs(&self, layout: &RunLayout, assembler: &RunAssembler) {
        let Some(run) = assembler.last() else { return };
        let hosts: Vec<String> = run
            .clients
            .iter()
            .chain(run.servers.iter())
            .cloned()
            .collect();
        if hosts.is_empty() {
            return;
        }
        let raw = match self.harvester.collect(&hosts).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("configuration harvesting failed: {e:#}");
                return;
            }
        };
        let (values, truncated) = docs::parse_config_stream(&raw);
        if let Some(err) = truncated {
            tracing::warn!("configuration stream ended early: {err}");
        }
        let (documents, skipped) = docs::config_documents(run, values);
        if skipped > 0 {
            tracing::warn!("{skipped} harvested objects lacked host/kind fields");
        }
        for doc in &documents {
            let path = layout.config_doc_path(&doc.host, &doc.kind);
            if let Err(e) = docs::write_document(doc, &path) {
                tracing::warn!("cannot write {}: {e}", path.display());
            }
        }
    }

    /// Re-processes an executed run. Identities are recovered from the
    /// directory layout; nothing is planned or regenerated.
    pub async fn run_replay(
        &self,
        layout: &RunLayout,
        tool_group: &str,
    ) -> Result<RunOutcome, RunError> {
        let iterations = plan::recover(layout)?;

        let completed = Arc::new(AtomicUsize::new(0));
        let mut jobs: JoinSet<()> = JoinSet::new();
        let mut launched = 0usize;
        let mut samples_run = 0usize;

        for it in &iterations {
            let Some((last_index, last_dir)) = it.samples.last().cloned() else {
                continue;
            };
            samples_run += it.samples.len();
            match self.mode {
                PostprocessMode::Html => {
                    for (index, dir) in &it.samples {
                        if *index == last_index {
                            continue;
                        }
                        let spec = self.replay_spec(layout, it, dir.clone(), false, tool_group);
                        self.spawn_background(&mut jobs, spec, &completed);
                        launched += 1;
                    }
                    // The coarse barrier: every outstanding background job
                    // in the run, not just this iteration's.
                    self.join_background(&mut jobs, launched, &completed).await;

                    eprintln!(
                        "post-processing iteration {} ({}) final sample",
                        it.id, it.label
                    );
                    let spec = self.replay_spec(layout, it, last_dir, true, tool_group);
                    if let Err(e) = self.samples.run_sample(&spec).await {
                        tracing::warn!("final sample of iteration {} failed: {e:#}", it.id);
                    }
                }
                PostprocessMode::Cdm => {
                    for (index, dir) in &it.samples {
                        let spec = self.replay_spec(
                            layout,
                            it,
                            dir.clone(),
                            *index == last_index,
                            tool_group,
                        );
                        self.spawn_background(&mut jobs, spec, &completed);
                        launched += 1;
                    }
                }
            }
        }
        self.join_background(&mut jobs, launched, &completed).await;

        Ok(RunOutcome {
            run_dir: layout.base().to_path_buf(),
            parts: 0,
            iterations: iterations.len(),
            samples: samples_run,
        })
    }

    fn replay_spec(
        &self,
        layout: &RunLayout,
        it: &RecoveredIteration,
        sample_dir: PathBuf,
        is_last: bool,
        tool_group: &str,
    ) -> SampleSpec {
        SampleSpec {
            iteration_doc: layout.iteration_doc_path(it.id),
            sample_dir,
            run_dir: layout.base().to_path_buf(),
            tool_group: tool_group.to_string(),
            is_last,
            mode: self.mode,
            replay: true,
        }
    }

    fn spawn_background(
        &self,
        jobs: &mut JoinSet<()>,
        spec: SampleSpec,
        completed: &Arc<AtomicUsize>,
    ) {
        let runner = Arc::clone(&self.samples);
        let completed = Arc::clone(completed);
        jobs.spawn(async move {
            if let Err(e) = runner.run_sample(&spec).await {
                // Logged only; replay stays optimistic by design.
                tracing::warn!(
                    "background sample {} failed: {e:#}",
                    spec.sample_dir.display()
                );
            }
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// Waits for every outstanding background job in the run. The counter
    /// only decides whether the wait is worth mentioning.
    async fn join_background(
        &self,
        jobs: &mut JoinSet<()>,
        launched: usize,
        completed: &Arc<AtomicUsize>,
    ) {
        if completed.load(Ordering::SeqCst) < launched {
            eprintln!("waiting for background sample jobs to finish");
        }
        while let Some(res) = jobs.join_next().await {
            if let Err(e) = res {
                tracing::warn!("background sample task failed to join: {e}");
            }
        }
    }
}
