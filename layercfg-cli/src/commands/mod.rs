//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `generate`: Write base files from schema defaults
//! - `show`: Print resolved values in various formats
//! - `check`: Report warnings raised while loading
//! - `namespaces`: List declared namespaces
//! - `completions`: Generate shell completion scripts

pub mod check;
pub mod completions;
pub mod generate;
pub mod namespaces;
pub mod show;

pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use generate::GenerateCommand;
pub use namespaces::NamespacesCommand;
pub use show::ShowCommand;
