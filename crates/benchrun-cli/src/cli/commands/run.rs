use std::sync::Arc;

use benchrun_core::config::Config;
use benchrun_core::docs::{RunContext, UserMetadata};
use benchrun_core::engine::install_interrupt_handler;
use benchrun_core::layout::{self, RunLayout};
use benchrun_core::params::split_parameter_sets;
use benchrun_core::services::process::{ProcessServices, ShellHook};
use benchrun_core::services::SampleHook;
use benchrun_core::{Coordinator, InterruptFlag, RunError};

use super::super::args::Cli;
use crate::exit_codes::{COMMAND_FAILED, INTERNAL_ERROR, SUCCESS};

pub(crate) async fn run(cli: Cli, config: Config) -> anyhow::Result<i32> {
    if !config.knows_benchmark(&cli.benchmark) {
        eprintln!(
            "benchrun: unknown benchmark `{}`; `benchrun list` shows what is available",
            cli.benchmark
        );
        return Ok(INTERNAL_ERROR);
    }

    let samples = cli.samples.unwrap_or(config.samples);
    if samples == 0 {
        eprintln!("benchrun: --samples must be at least 1");
        return Ok(INTERNAL_ERROR);
    }
    let tool_group = cli
        .tool_group
        .clone()
        .unwrap_or_else(|| config.tool_group.clone());
    let sysinfo = cli
        .sysinfo
        .clone()
        .unwrap_or_else(|| config.sysinfo.clone());
    let mode = cli.postprocess_mode.unwrap_or(config.postprocess_mode);

    let services = ProcessServices::new(&config.tools);
    let mut coordinator = Coordinator::new(
        services.expansion,
        services.samples,
        services.telemetry,
        services.harvester,
        mode,
    );

    if cli.postprocess_only {
        let Some(dir) = cli.dir else {
            eprintln!("benchrun: --postprocess-only needs --dir pointing at an existing run");
            return Ok(INTERNAL_ERROR);
        };
        if !dir.is_dir() {
            eprintln!("benchrun: {} is not a directory", dir.display());
            return Ok(INTERNAL_ERROR);
        }
        let run_layout = RunLayout::new(dir);
        return match coordinator.run_replay(&run_layout, &tool_group).await {
            Ok(outcome) => {
                eprintln!(
                    "re-processed {} iterations ({} samples) in {}",
                    outcome.iterations,
                    outcome.samples,
                    outcome.run_dir.display()
                );
                Ok(SUCCESS)
            }
            Err(e) => Ok(report(&e)),
        };
    }

    if cli.clients.is_empty() {
        eprintln!("benchrun: at least one --clients host is required");
        return Ok(INTERNAL_ERROR);
    }
    let sets = match split_parameter_sets(&cli.params) {
        Ok(sets) => sets,
        Err(e) => {
            eprintln!("benchrun: {e}");
            return Ok(INTERNAL_ERROR);
        }
    };

    if let Some(cmd) = &cli.pre_sample_cmd {
        coordinator = coordinator.with_hook(Arc::new(ShellHook::new(cmd)) as Arc<dyn SampleHook>);
    }

    let date = layout::run_date();
    let base = cli.dir.unwrap_or_else(|| config.run_dir.clone());
    let run_layout = RunLayout::new(base.join(layout::run_dir_name(&cli.benchmark, &date)));

    let ctx = RunContext {
        benchmark: cli.benchmark.clone(),
        clients: cli.clients.clone(),
        servers: cli.servers.clone(),
        user: UserMetadata {
            name: cli.user_name,
            email: cli.user_email,
            description: cli.user_desc,
            tags: cli.user_tags,
        },
        tool_group,
        sysinfo,
        date,
    };

    let interrupt = InterruptFlag::new();
    install_interrupt_handler(interrupt.clone());

    match coordinator
        .run_live(ctx, &run_layout, &sets, samples, interrupt)
        .await
    {
        Ok(outcome) => {
            eprintln!(
                "run complete: {} iterations, {} samples, results in {}",
                outcome.iterations,
                outcome.samples,
                outcome.run_dir.display()
            );
            Ok(SUCCESS)
        }
        Err(e) => Ok(report(&e)),
    }
}

fn report(e: &RunError) -> i32 {
    eprintln!("benchrun: {e}");
    if e.is_config() {
        INTERNAL_ERROR
    } else {
        COMMAND_FAILED
    }
}
