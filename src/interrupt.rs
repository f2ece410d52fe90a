//! Interrupt handling around the deploy child
//!
//! The deploy script shares the console with the installer, so Ctrl+C reaches
//! both processes. While the child is running the installer ignores the signal
//! and lets the child decide how to exit; the normal cleanup path then removes
//! the temp script. Outside that window the installer removes every registered
//! temp file itself and exits with 130.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

/// Exit code used when interrupted outside a child run (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Global cleanup registry
/// Using OnceLock for safe lazy initialization
static CLEANUP_REGISTRY: OnceLock<Arc<Mutex<CleanupRegistry>>> = OnceLock::new();

/// What the signal handler should do with an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// A child is running; let it exit and clean up afterwards
    Defer,
    /// Temp files removed; terminate now
    Exit,
}

/// Registry tracking temp files and whether the deploy child is running
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    temp_files: HashSet<PathBuf>,
    child_running: bool,
}

impl CleanupRegistry {
    /// Get or create the global registry
    pub fn global() -> Arc<Mutex<CleanupRegistry>> {
        CLEANUP_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(CleanupRegistry::default())))
            .clone()
    }

    /// Track a temp file for removal on interrupt
    pub fn register_temp(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!("Registered temp file {}", path.display());
        self.temp_files.insert(path);
    }

    /// Stop tracking a temp file (called once it has been removed normally)
    pub fn unregister_temp(&mut self, path: &Path) {
        self.temp_files.remove(path);
        debug!("Unregistered temp file {}", path.display());
    }

    /// Number of tracked temp files
    pub fn count(&self) -> usize {
        self.temp_files.len()
    }

    pub fn set_child_running(&mut self, running: bool) {
        self.child_running = running;
    }

    pub fn child_running(&self) -> bool {
        self.child_running
    }

    /// Remove every tracked temp file; failures are ignored.
    pub fn remove_all(&mut self) {
        for path in self.temp_files.drain() {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Could not remove {}: {}", path.display(), e);
            }
        }
    }

    /// Decide how to react to Ctrl+C / SIGTERM
    pub fn on_interrupt(&mut self) -> InterruptAction {
        if self.child_running {
            InterruptAction::Defer
        } else {
            self.remove_all();
            InterruptAction::Exit
        }
    }
}

/// Marks the deploy child as running for as long as the scope lives
pub struct ChildScope {
    registry: Arc<Mutex<CleanupRegistry>>,
}

impl ChildScope {
    /// Enter the scope on the global registry
    pub fn enter() -> Self {
        Self::enter_on(CleanupRegistry::global())
    }

    pub fn enter_on(registry: Arc<Mutex<CleanupRegistry>>) -> Self {
        if let Ok(mut guard) = registry.lock() {
            guard.set_child_running(true);
        }
        Self { registry }
    }
}

impl Drop for ChildScope {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.registry.lock() {
            guard.set_child_running(false);
        }
    }
}

/// Install the Ctrl+C / SIGTERM handler
/// Call this once at program start
pub fn init_signal_handlers() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        let action = match CleanupRegistry::global().lock() {
            Ok(mut registry) => registry.on_interrupt(),
            Err(_) => InterruptAction::Exit,
        };

        match action {
            InterruptAction::Defer => {
                info!("Interrupt received, waiting for the deploy script to exit");
            }
            InterruptAction::Exit => {
                info!("Interrupt received, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    })
}
