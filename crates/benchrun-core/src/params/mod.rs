//! Parameter handling: tokenizing iteration strings, finding tokens shared
//! across sequences, deriving iteration labels, and splitting the raw CLI
//! parameter vector into parameter sets.

mod common;
mod label;
mod set;
mod tokenize;

pub use common::common_tokens;
pub use label::label_for;
pub use set::{split_parameter_sets, ParameterSet, SET_SEPARATOR};
pub use tokenize::tokenize;
