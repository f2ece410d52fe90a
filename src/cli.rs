use crate::types::RunMode;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Switches accepted in any case with one or two leading dashes
const SWITCHES: &[&str] = &["silent", "verify", "json", "help", "version", "verbose"];

/// Options that take a value
const VALUE_OPTIONS: &[&str] = &["target-dir"];

/// powerpack - AI Power Pack installer
#[derive(Parser, Debug, Default)]
#[command(name = "powerpack")]
#[command(about = "Deploys the AI Power Pack rule files and verifies them")]
#[command(version)]
pub struct Cli {
    /// Suppress prompts and key waits during deployment
    #[arg(long)]
    pub silent: bool,

    /// Check previously deployed files instead of deploying (ignores --silent)
    #[arg(long)]
    pub verify: bool,

    /// Directory to deploy into or verify.
    ///
    /// Deploys default to the directory containing this program; verification
    /// defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Print the verification report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Arguments dropped during normalization
    #[arg(skip)]
    pub ignored: Vec<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse_normalized(std::env::args_os())
    }

    /// Parse after normalizing launcher-style flags; clap handles help/version exits.
    pub fn parse_normalized<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let (args, ignored) = normalize_args(args);
        let mut cli = <Self as Parser>::parse_from(args);
        cli.ignored = ignored;
        cli
    }

    /// Fallible variant of `parse_normalized`
    pub fn try_parse_normalized<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = OsString>,
    {
        let (args, ignored) = normalize_args(args);
        let mut cli = <Self as Parser>::try_parse_from(args)?;
        cli.ignored = ignored;
        Ok(cli)
    }

    pub fn mode(&self) -> RunMode {
        RunMode::from_flags(self.silent, self.verify)
    }
}

/// Rewrite argv so clap sees canonical `--name` flags.
///
/// `-Silent`, `-VERIFY` and `--Json` become `--silent`, `--verify` and
/// `--json`. Short clap flags (`-h`, `-V`, `-v`, `-vv`) pass through. Anything
/// unrecognized, including a value option with no value, is returned
/// separately and never reaches clap.
pub fn normalize_args<I>(args: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter().peekable();
    let mut normalized: Vec<OsString> = iter.next().into_iter().collect();
    let mut ignored = Vec::new();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            ignored.push(arg.to_string_lossy().into_owned());
            continue;
        };

        if is_short_flag(text) {
            normalized.push(arg);
            continue;
        }

        let (flag, inline_value) = match text.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (text, None),
        };
        let dashes = flag.len() - flag.trim_start_matches('-').len();
        let name = flag[dashes..].to_ascii_lowercase();

        if dashes == 0 || dashes > 2 {
            ignored.push(text.to_string());
        } else if SWITCHES.contains(&name.as_str()) && inline_value.is_none() {
            normalized.push(format!("--{name}").into());
        } else if VALUE_OPTIONS.contains(&name.as_str()) {
            match inline_value {
                Some(value) if !value.is_empty() => {
                    normalized.push(format!("--{name}={value}").into());
                }
                Some(_) => ignored.push(text.to_string()),
                None => match iter.next_if(|next| !is_missing_value(next)) {
                    Some(value) => {
                        normalized.push(format!("--{name}").into());
                        normalized.push(value);
                    }
                    // A dangling option must not abort the run
                    None => ignored.push(text.to_string()),
                },
            }
        } else {
            ignored.push(text.to_string());
        }
    }

    (normalized, ignored)
}

/// Empty, or another flag standing where a value was expected
fn is_missing_value(arg: &OsString) -> bool {
    arg.is_empty() || arg.to_str().is_some_and(|s| s.starts_with('-'))
}

/// `-h`, `-V` and runs of `-v`
fn is_short_flag(text: &str) -> bool {
    match text.strip_prefix('-') {
        Some("h") | Some("V") => true,
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c == 'v'),
        None => false,
    }
}
