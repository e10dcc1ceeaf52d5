//! Shared plumbing for the `docscan` binaries: argument parsing and logging.
pub mod args;
pub mod logging;
