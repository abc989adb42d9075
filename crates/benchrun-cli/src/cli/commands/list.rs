use benchrun_core::Config;

use crate::exit_codes::SUCCESS;

/// Prints the benchmarks this installation knows how to drive.
pub fn run(config: &Config) -> anyhow::Result<i32> {
    for name in &config.benchmarks {
        println!("{name}");
    }
    Ok(SUCCESS)
}
