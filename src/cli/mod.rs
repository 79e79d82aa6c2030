//! Command Line Interface (CLI) layer for endocrop.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`): merge the optional JSON config
//! with flags, run the batch with a progress bar, print the summary, and
//! apply the failure policy to the exit status.
//!
//! If you are embedding endocrop into another application, prefer using
//! the high-level `endocrop::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
