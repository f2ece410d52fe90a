//! powerpack Library
//!
//! This library provides the core functionality of the AI Power Pack installer:
//! shell discovery, deploy script rendering and execution, and verification of
//! the deployed rule files.

pub mod app;
pub mod cli;
pub mod deployer;
pub mod encoding;
pub mod error;
pub mod interrupt;
pub mod prompt;
pub mod script;
pub mod shell;
pub mod templates;
pub mod types;
pub mod verify;

// Re-export main types for convenience
pub use app::App;
pub use deployer::{DeployOutcome, Deployer};
pub use error::{PowerPackError, Result};
pub use prompt::{ConsolePrompter, Prompter};
pub use shell::{ResolvedShell, ShellFlavor, ShellResolver};
pub use templates::{TEMPLATES, TemplateFile, VERSION};
pub use types::RunMode;
pub use verify::{verify, Checklist, VerificationReport};
