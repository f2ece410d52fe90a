//! Shell discovery
//!
//! Probes an ordered list of candidate shell executables and returns the first
//! usable one:
//! - A candidate that exists as a file is accepted without spawning anything
//! - Otherwise it is spawned with a version/no-op query and accepted on exit 0
//! - Spawn failures and non-zero exits fall through to the next candidate

use crate::error::{PowerPackError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use strum::Display;
use tracing::{debug, info};

/// Shell dialect the deploy script is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShellFlavor {
    /// Windows PowerShell (`powershell.exe`)
    #[strum(serialize = "PowerShell")]
    PowerShell,
    /// POSIX `sh`
    #[strum(serialize = "POSIX sh")]
    Posix,
}

impl ShellFlavor {
    /// Flavor for the platform this binary was built for
    pub fn native() -> Self {
        if cfg!(windows) {
            ShellFlavor::PowerShell
        } else {
            ShellFlavor::Posix
        }
    }

    /// Candidates in priority order: 64-bit system dir, 32-bit system dir, bare name.
    pub fn default_candidates(self) -> Vec<PathBuf> {
        match self {
            ShellFlavor::PowerShell => {
                let root = std::env::var_os("SystemRoot")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
                let under = |system_dir: &str| {
                    root.join(system_dir)
                        .join("WindowsPowerShell")
                        .join("v1.0")
                        .join("powershell.exe")
                };
                vec![
                    under("System32"),
                    under("SysWOW64"),
                    PathBuf::from("powershell.exe"),
                ]
            }
            ShellFlavor::Posix => vec![
                PathBuf::from("/bin/sh"),
                PathBuf::from("/usr/bin/sh"),
                PathBuf::from("sh"),
            ],
        }
    }

    /// Arguments for the minimal invocability probe
    pub fn probe_args(self) -> &'static [&'static str] {
        match self {
            ShellFlavor::PowerShell => &["-Version"],
            ShellFlavor::Posix => &["-c", ":"],
        }
    }

    /// Arguments that run `script` without user profiles or script policy checks.
    pub fn invocation_args(self, script: &Path) -> Vec<OsString> {
        match self {
            ShellFlavor::PowerShell => vec![
                "-NoProfile".into(),
                "-ExecutionPolicy".into(),
                "Bypass".into(),
                "-File".into(),
                script.as_os_str().to_os_string(),
            ],
            // A non-interactive sh reads no profile and has no execution policy
            ShellFlavor::Posix => vec![script.as_os_str().to_os_string()],
        }
    }

    /// Extension of the temporary deploy script
    pub fn script_extension(self) -> &'static str {
        match self {
            ShellFlavor::PowerShell => ".ps1",
            ShellFlavor::Posix => ".sh",
        }
    }

    /// Whether the temp script itself starts with a BOM.
    ///
    /// Windows PowerShell reads BOM-less scripts in the ANSI code page. `sh`
    /// would parse the mark as part of the first command word.
    pub fn script_bom(self) -> bool {
        matches!(self, ShellFlavor::PowerShell)
    }
}

/// A shell that passed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShell {
    pub program: PathBuf,
    pub flavor: ShellFlavor,
}

/// Ordered-fallback shell lookup.
#[derive(Debug, Clone)]
pub struct ShellResolver {
    flavor: ShellFlavor,
    candidates: Vec<PathBuf>,
}

impl ShellResolver {
    /// Resolver over the flavor's default candidates
    pub fn new(flavor: ShellFlavor) -> Self {
        Self::with_candidates(flavor, flavor.default_candidates())
    }

    /// Resolver over an explicit candidate list
    pub fn with_candidates(flavor: ShellFlavor, candidates: Vec<PathBuf>) -> Self {
        Self { flavor, candidates }
    }

    pub fn flavor(&self) -> ShellFlavor {
        self.flavor
    }

    /// Return the first usable candidate, or `ShellNotFound`.
    pub fn resolve(&self) -> Result<ResolvedShell> {
        for candidate in &self.candidates {
            if candidate.is_file() {
                info!("Using {} at {}", self.flavor, candidate.display());
                return Ok(self.resolved(candidate));
            }

            if probe(candidate, self.flavor.probe_args()) {
                info!("Using {} via probe: {}", self.flavor, candidate.display());
                return Ok(self.resolved(candidate));
            }
        }

        let tried = self
            .candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect();
        Err(PowerPackError::shell_not_found(self.flavor.to_string(), tried))
    }

    fn resolved(&self, program: &Path) -> ResolvedShell {
        ResolvedShell {
            program: program.to_path_buf(),
            flavor: self.flavor,
        }
    }
}

/// Spawn `program args`, silenced, and report whether it exited 0.
fn probe(program: &Path, args: &[&str]) -> bool {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .without_window()
        .status();

    match status {
        Ok(status) if status.code() == Some(0) => true,
        Ok(status) => {
            debug!("Probe {} exited with {:?}", program.display(), status.code());
            false
        }
        Err(e) => {
            debug!("Probe {} failed to spawn: {}", program.display(), e);
            false
        }
    }
}

/// Extension trait for std::process::Command to suppress console windows
pub trait CommandNoWindow {
    /// Do not open a console window for the child (no-op off Windows)
    fn without_window(&mut self) -> &mut Self;
}

impl CommandNoWindow for Command {
    #[cfg(windows)]
    fn without_window(&mut self) -> &mut Self {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn without_window(&mut self) -> &mut Self {
        self
    }
}
