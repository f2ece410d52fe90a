//! Property-Based Tests for powerpack
//!
//! These tests verify:
//! - Launcher flags are recognized in any letter case
//! - Unrecognized arguments never change the run mode
//! - Marker checks pass when any one file carries the marker

use powerpack::cli::{normalize_args, Cli};
use powerpack::types::RunMode;
use powerpack::verify::{verify_with, Checklist};
use proptest::prelude::*;
use std::ffi::OsString;

// =============================================================================
// Flag Normalization Property Tests
// =============================================================================

/// Strategy that randomizes the case of every letter in `word`
fn any_case(word: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

fn dashes() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("-"), Just("--")]
}

fn argv(args: &[String]) -> Vec<OsString> {
    std::iter::once(OsString::from("powerpack"))
        .chain(args.iter().map(OsString::from))
        .collect()
}

proptest! {
    /// -silent in any case selects silent mode
    #[test]
    fn silent_flag_any_case(word in any_case("silent"), dash in dashes()) {
        let cli = Cli::try_parse_normalized(argv(&[format!("{dash}{word}")])).unwrap();
        prop_assert_eq!(cli.mode(), RunMode::Silent);
        prop_assert!(cli.ignored.is_empty());
    }

    /// -verify wins over -silent regardless of case and order
    #[test]
    fn verify_flag_wins(
        verify in any_case("verify"),
        silent in any_case("silent"),
        verify_first in any::<bool>(),
    ) {
        let (v, s) = (format!("-{verify}"), format!("-{silent}"));
        let args = if verify_first { vec![v, s] } else { vec![s, v] };
        let cli = Cli::try_parse_normalized(argv(&args)).unwrap();
        prop_assert_eq!(cli.mode(), RunMode::Verify);
    }

    /// A -target-dir with no value is dropped and the other flags still apply
    #[test]
    fn dangling_target_dir_is_ignored(
        option in any_case("target-dir"),
        silent in any_case("silent"),
        option_first in any::<bool>(),
    ) {
        let (t, s) = (format!("-{option}"), format!("-{silent}"));
        let args = if option_first { vec![t.clone(), s] } else { vec![s, t.clone()] };
        let cli = Cli::try_parse_normalized(argv(&args)).unwrap();
        prop_assert_eq!(cli.mode(), RunMode::Silent);
        prop_assert!(cli.target_dir.is_none());
        prop_assert_eq!(cli.ignored, vec![t]);
    }

    /// Bare words are collected as ignored and leave the mode interactive
    #[test]
    fn positional_words_are_ignored(words in prop::collection::vec("[a-zA-Z0-9_.]{1,12}", 0..5)) {
        let (normalized, ignored) = normalize_args(argv(&words));
        prop_assert_eq!(normalized, vec![OsString::from("powerpack")]);
        prop_assert_eq!(&ignored, &words);

        let cli = Cli::try_parse_normalized(argv(&words)).unwrap();
        prop_assert_eq!(cli.mode(), RunMode::Interactive);
    }
}

// =============================================================================
// Marker OR Semantics Property Tests
// =============================================================================

const FILES: &[&str] = &["one.md", "two.md", "three.md"];
const MARKERS: &[&str] = &["alpha", "beta", "gamma", "delta"];

proptest! {
    /// Each marker passes exactly when some file contains it
    #[test]
    fn marker_passes_iff_any_file_has_it(
        placement in prop::collection::vec(prop::collection::vec(any::<bool>(), MARKERS.len()), FILES.len()),
    ) {
        let dir = tempfile::tempdir().unwrap();
        for (file, row) in FILES.iter().zip(&placement) {
            let text: Vec<&str> = MARKERS
                .iter()
                .zip(row)
                .filter(|(_, present)| **present)
                .map(|(m, _)| *m)
                .collect();
            std::fs::write(dir.path().join(file), text.join("\n")).unwrap();
        }

        let checklist = Checklist { files: FILES, content: MARKERS, frameworks: &[] };
        let report = verify_with(dir.path(), &checklist);

        for (i, item) in report.content().iter().enumerate() {
            let expected = placement.iter().any(|row| row[i]);
            prop_assert_eq!(item.passed, expected, "marker {}", item.label);
        }
        prop_assert_eq!(report.summary().files_passed, FILES.len());
    }
}
