//! Unified exit codes for benchrun.
//! These codes are part of the public contract; wrappers and CI jobs key
//! off them to distinguish bad invocations from failed runs.

pub const SUCCESS: i32 = 0;
pub const COMMAND_FAILED: i32 = 1; // Expansion, sample, or tool step failed mid-run
pub const INTERNAL_ERROR: i32 = 2; // Bad arguments or configuration, nothing executed
