//! Plan execution: the live sequential path and the replay bulk path.

mod coordinator;
mod interrupt;

pub use coordinator::{Coordinator, RunOutcome};
pub use interrupt::{install as install_interrupt_handler, InterruptFlag};
