//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod genstatus;
pub mod run;
