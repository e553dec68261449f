//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI.

pub mod autoreply;
pub mod check;
pub mod reply;

pub use autoreply::{build_generator, build_responder, once as autoreply_once, run as autoreply_run};
pub use check::CheckSummary;
