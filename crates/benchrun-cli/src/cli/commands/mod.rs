use benchrun_core::Config;

use super::args::Cli;
use crate::exit_codes::INTERNAL_ERROR;

pub mod list;
pub(crate) mod run;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("benchrun: {e}");
                return Ok(INTERNAL_ERROR);
            }
        },
        None => Config::default(),
    };
    if cli.benchmark == "list" {
        return list::run(&config);
    }
    run::run(cli, config).await
}
