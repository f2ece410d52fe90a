//! Application module
//!
//! Top-level deploy and verify flows with their exit codes and key waits.
//! `main` builds an `App` over the native shell and the console prompter.

use crate::cli::Cli;
use crate::deployer::{program_dir, DeployOutcome, Deployer};
use crate::prompt::Prompter;
use crate::shell::{ResolvedShell, ShellResolver};
use crate::types::RunMode;
use crate::verify::{self, SystemInfo};
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{error, info};

/// Final prompt after the verification report and after setup failures
pub const EXIT_PROMPT: &str = "\nPress any key to exit...";

/// Exit code for shell-not-found and orchestrator errors
pub const FAILURE_EXIT_CODE: i32 = 1;

/// One installer run over an injected shell resolver and prompter
pub struct App<'a> {
    resolver: ShellResolver,
    prompter: &'a dyn Prompter,
    temp_dir: Option<PathBuf>,
    detached_input: bool,
}

impl<'a> App<'a> {
    pub fn new(resolver: ShellResolver, prompter: &'a dyn Prompter) -> Self {
        Self {
            resolver,
            prompter,
            temp_dir: None,
            detached_input: false,
        }
    }

    /// Forwarded to `Deployer::temp_dir`
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Forwarded to `Deployer::detached_input`
    pub fn detached_input(mut self, detached: bool) -> Self {
        self.detached_input = detached;
        self
    }

    /// Dispatch on the run mode and return the process exit code.
    pub fn run(&self, cli: &Cli) -> i32 {
        match cli.mode() {
            RunMode::Verify => self.run_verify(cli),
            mode => self.run_deploy(cli, mode),
        }
    }

    /// Verify mode: always 0, the verdict is informational only
    pub fn run_verify(&self, cli: &Cli) -> i32 {
        if let Err(e) = self.verify_target(cli) {
            error!("Verification could not complete: {:#}", e);
            eprintln!("ERROR: {:#}", e);
        }
        0
    }

    fn verify_target(&self, cli: &Cli) -> Result<()> {
        let root = match &cli.target_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read the current directory")?,
        };

        let report = verify::verify(&root);
        let summary = report.summary();
        info!(
            "Verification of {}: files {}/{}, content {}/{}, frameworks {}/{}",
            root.display(),
            summary.files_passed,
            summary.files_total,
            summary.content_passed,
            summary.content_total,
            summary.frameworks_passed,
            summary.frameworks_total
        );

        if cli.json {
            let json = report
                .to_json()
                .context("Failed to serialize the verification report")?;
            println!("{json}");
            return Ok(());
        }

        let stdout = std::io::stdout();
        let color = stdout.is_terminal();
        report
            .render(&mut stdout.lock(), &SystemInfo::detect(&root), color)
            .context("Failed to write the verification report")?;

        self.prompter.wait_for_key(EXIT_PROMPT);
        Ok(())
    }

    /// Deploy mode: the child's exit code, or 1 on setup failures
    pub fn run_deploy(&self, cli: &Cli, mode: RunMode) -> i32 {
        let flavor = self.resolver.flavor();
        let shell = match self.resolver.resolve() {
            Ok(shell) => shell,
            Err(e) => {
                error!("{}", e);
                println!("ERROR: {flavor} not found on this system.");
                println!("Please install {flavor} to use this tool.");
                self.wait_unless_silent(mode);
                return FAILURE_EXIT_CODE;
            }
        };

        match self.deploy(cli, mode, shell) {
            Ok(outcome) => outcome.exit_code,
            Err(e) => {
                error!("Deployment failed: {:#}", e);
                println!("ERROR: {:#}", e);
                self.wait_unless_silent(mode);
                FAILURE_EXIT_CODE
            }
        }
    }

    fn deploy(&self, cli: &Cli, mode: RunMode, shell: ResolvedShell) -> Result<DeployOutcome> {
        let target = match &cli.target_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                dir.clone()
            }
            None => program_dir().context("Failed to locate the installer directory")?,
        };

        let mut deployer = Deployer::new(shell, mode, &target, self.prompter)
            .detached_input(self.detached_input);
        if let Some(dir) = &self.temp_dir {
            deployer = deployer.temp_dir(dir);
        }

        let outcome = deployer
            .deploy()
            .with_context(|| format!("Deployment into {} failed", target.display()))?;
        Ok(outcome)
    }

    fn wait_unless_silent(&self, mode: RunMode) {
        if !mode.is_silent() {
            self.prompter.wait_for_key(EXIT_PROMPT);
        }
    }
}
