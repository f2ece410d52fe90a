//! powerpack - Main entry point
//!
//! Deploys the AI Power Pack rule files through the system shell, or audits a
//! previous deployment with `-verify`.

use tracing::{debug, info, warn};

use powerpack::app::App;
use powerpack::cli::Cli;
use powerpack::interrupt;
use powerpack::prompt::ConsolePrompter;
use powerpack::shell::{ShellFlavor, ShellResolver};
use powerpack::templates::VERSION;

/// Initialize the tracing subscriber; RUST_LOG overrides the -v level
fn init_logger(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application entry point
fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    info!("powerpack v{} starting", VERSION);

    for arg in &cli.ignored {
        debug!("Ignoring unrecognized argument: {}", arg);
    }

    // Keeps Ctrl+C from skipping temp script cleanup
    if let Err(e) = interrupt::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let prompter = ConsolePrompter;
    let code = App::new(ShellResolver::new(ShellFlavor::native()), &prompter).run(&cli);

    debug!("Exiting with code {}", code);
    std::process::exit(code);
}
