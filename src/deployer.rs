//! Deployment orchestration
//!
//! Runs the rendered deploy script through the resolved shell:
//!
//! 1. Render the script for the shell's flavor
//! 2. Write it to `<temp>/deploy_<random>.<ext>`
//! 3. Spawn the shell on it, sharing the console, in the target directory
//! 4. Block until the child exits (no timeout)
//! 5. Remove the temp script on every path; removal errors are swallowed
//!
//! The run mode reaches the child through `POWERPACK_SILENT`, never through
//! the script text.

use crate::encoding::encode_with_bom;
use crate::error::{PowerPackError, Result};
use crate::interrupt::{ChildScope, CleanupRegistry};
use crate::prompt::Prompter;
use crate::script::{self, SILENT_ENV};
use crate::shell::{CommandNoWindow, ResolvedShell};
use crate::templates::TEMPLATES;
use crate::types::RunMode;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::process::{Command, Stdio};
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Fixed prefix of the temp script file name
pub const SCRIPT_PREFIX: &str = "deploy_";

/// Length of the random token in the temp script name
const SCRIPT_TOKEN_LEN: usize = 32;

/// Printed (interactive mode only) when the child exits non-zero
pub const WARNINGS_PROMPT: &str = "\nDeployment completed with warnings. Press any key to exit...";

/// Result of a finished deploy child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Child exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Where the temp script lived; removed by the time this is returned
    pub script_path: PathBuf,
}

impl DeployOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One deploy run against a resolved shell.
pub struct Deployer<'a> {
    shell: ResolvedShell,
    mode: RunMode,
    working_dir: PathBuf,
    prompter: &'a dyn Prompter,
    temp_dir: Option<PathBuf>,
    detached_input: bool,
}

impl<'a> Deployer<'a> {
    pub fn new(
        shell: ResolvedShell,
        mode: RunMode,
        working_dir: impl Into<PathBuf>,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            shell,
            mode,
            working_dir: working_dir.into(),
            prompter,
            temp_dir: None,
            detached_input: false,
        }
    }

    /// Create the temp script under `dir` instead of the OS temp directory
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Give the child a closed stdin instead of the console's
    pub fn detached_input(mut self, detached: bool) -> Self {
        self.detached_input = detached;
        self
    }

    /// Run the whole deploy sequence and return the child's exit code.
    pub fn deploy(&self) -> Result<DeployOutcome> {
        let flavor = self.shell.flavor;
        let rendered = script::render(flavor, &TEMPLATES)?;
        let bytes = if flavor.script_bom() {
            encode_with_bom(&rendered)
        } else {
            rendered.into_bytes()
        };

        let registry = CleanupRegistry::global();
        let temp_path = self.write_temp_script(&bytes, &registry)?;
        let script_path = temp_path.to_path_buf();

        let result = self.run_child(&script_path);

        // Best-effort cleanup on every path
        if let Err(e) = temp_path.close() {
            debug!("Could not remove temp script {}: {}", script_path.display(), e);
        }
        if let Ok(mut guard) = registry.lock() {
            guard.unregister_temp(&script_path);
        }

        let exit_code = result?;
        if exit_code != 0 && !self.mode.is_silent() {
            self.prompter.wait_for_key(WARNINGS_PROMPT);
        }

        Ok(DeployOutcome {
            exit_code,
            script_path,
        })
    }

    /// Create the temp script and register it with `registry` before any
    /// byte is written.
    fn write_temp_script(
        &self,
        bytes: &[u8],
        registry: &Mutex<CleanupRegistry>,
    ) -> Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(SCRIPT_PREFIX)
            .suffix(self.shell.flavor.script_extension())
            .rand_bytes(SCRIPT_TOKEN_LEN);

        // The interrupt handler takes the same lock, so it never sees the file untracked
        let mut file = {
            let mut guard = registry.lock().ok();
            let file = match &self.temp_dir {
                Some(dir) => builder.tempfile_in(dir)?,
                None => builder.tempfile()?,
            };
            if let Some(guard) = guard.as_mut() {
                guard.register_temp(file.path());
            }
            file
        };

        if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
            if let Ok(mut guard) = registry.lock() {
                guard.unregister_temp(file.path());
            }
            return Err(e.into());
        }

        // Close our handle so the shell can open the file on any platform
        Ok(file.into_temp_path())
    }

    fn run_child(&self, script_path: &Path) -> Result<i32> {
        let program = &self.shell.program;
        let args = self.shell.flavor.invocation_args(script_path);

        info!(
            "Running deploy script: {} {:?} (cwd={}, mode={})",
            program.display(),
            args,
            self.working_dir.display(),
            self.mode
        );

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .current_dir(&self.working_dir)
            .env(SILENT_ENV, self.mode.silent_env_value());
        if self.detached_input {
            cmd.stdin(Stdio::null());
        }
        if self.mode.is_silent() {
            cmd.without_window();
        }

        let status = {
            let _scope = ChildScope::enter();
            cmd.status()
                .map_err(|e| PowerPackError::spawn(program.display().to_string(), e))?
        };

        let code = status.code().unwrap_or(-1);
        if status.success() {
            info!("Deploy script finished successfully");
        } else {
            warn!("Deploy script exited with code {}", code);
        }
        Ok(code)
    }
}

/// Directory containing the running executable; the default deploy target.
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| PowerPackError::general(format!("{} has no parent directory", exe.display())))
}
