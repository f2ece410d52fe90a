//! Run-level types shared by the CLI, the deployer and the verifier.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How the installer runs, derived once from argv
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Deploy with banners and key waits
    #[default]
    Interactive,
    /// Deploy without any prompt or key wait
    Silent,
    /// Audit the deployed files only
    Verify,
}

impl RunMode {
    /// Resolve the mode from flag presence; verify wins over silent.
    pub fn from_flags(silent: bool, verify: bool) -> Self {
        match (verify, silent) {
            (true, _) => RunMode::Verify,
            (false, true) => RunMode::Silent,
            (false, false) => RunMode::Interactive,
        }
    }

    /// Whether prompts and key waits are suppressed
    pub fn is_silent(&self) -> bool {
        matches!(self, RunMode::Silent)
    }

    /// Value handed to the deploy child in `POWERPACK_SILENT`
    pub fn silent_env_value(&self) -> &'static str {
        if self.is_silent() { "1" } else { "0" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_verify_wins_over_silent() {
        assert_eq!(RunMode::from_flags(true, true), RunMode::Verify);
        assert_eq!(RunMode::from_flags(false, true), RunMode::Verify);
        assert_eq!(RunMode::from_flags(true, false), RunMode::Silent);
        assert_eq!(RunMode::from_flags(false, false), RunMode::Interactive);
    }

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!(RunMode::from_str("silent").unwrap(), RunMode::Silent);
        assert_eq!(RunMode::from_str("VERIFY").unwrap(), RunMode::Verify);
        assert!(RunMode::from_str("loud").is_err());
    }

    #[test]
    fn test_only_silent_suppresses_prompts() {
        let silent: Vec<RunMode> = RunMode::iter().filter(|m| m.is_silent()).collect();
        assert_eq!(silent, vec![RunMode::Silent]);
        assert_eq!(RunMode::Silent.silent_env_value(), "1");
        assert_eq!(RunMode::Interactive.silent_env_value(), "0");
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&RunMode::Verify).unwrap();
        assert_eq!(json, "\"verify\"");
        let parsed: RunMode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, RunMode::Verify);
    }
}
