//! Operator tooling for LexFlow licenses.
//!
//! The `lexflow-keys` binary sources arguments (flags, environment,
//! interactive prompts) and renders results; all license and registry logic
//! lives in `lexflow-license` and `lexflow-registry`.

pub mod cli;
pub mod prompt;
pub mod render;

pub use cli::{Cli, Command};
