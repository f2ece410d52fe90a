//! Installation verification
//!
//! Read-only audit of a deploy directory in three independent stages:
//! - Required files exist
//! - Content markers appear in at least one existing required file
//! - Framework names appear in at least one existing required file
//!
//! A marker counts as found when ANY scanned file contains it; which file
//! matched is not recorded. Unreadable files count as not containing anything.
//! Mismatches are informational only and never turn into errors.

use crate::encoding::decode_lossy;
use crate::error::Result;
use crate::templates::{PACK_NAME, VERSION};
use crossterm::style::Stylize;
use serde::Serialize;
use std::cell::OnceCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files every deploy must produce
pub const REQUIRED_FILES: &[&str] = &[
    "CLAUDE.md",
    "INITIAL.md",
    ".cursorrules",
    ".github/copilot-instructions.md",
];

/// Substrings proving the rule content was deployed
pub const CONTENT_MARKERS: &[&str] = &[
    "PLAN-EXECUTE",
    "200 lines",
    "Context Management",
    "Code Self-Execution",
];

/// Framework names the deployed documentation must mention
pub const FRAMEWORK_MARKERS: &[&str] = &[
    "Fabric",
    "Cursor Rules",
    "Context Engineering",
    "OpenSkills",
    "UI/UX Pro Max",
];

/// Remediation hints printed when any check fails
pub const FAILURE_HINTS: &[&str] = &[
    "1. Run the installer in the project root directory",
    "2. Ensure all files were deployed correctly",
    "3. Check file permissions",
];

pub const ALL_PASSED: &str = "ALL CHECKS PASSED";
pub const SOME_FAILED: &str = "SOME CHECKS FAILED";

/// The three lists checked by `verify_with`
#[derive(Debug, Clone, Copy)]
pub struct Checklist<'a> {
    pub files: &'a [&'a str],
    pub content: &'a [&'a str],
    pub frameworks: &'a [&'a str],
}

impl Checklist<'static> {
    /// The checklist matching the embedded pack
    pub fn standard() -> Self {
        Self {
            files: REQUIRED_FILES,
            content: CONTENT_MARKERS,
            frameworks: FRAMEWORK_MARKERS,
        }
    }
}

/// One checklist entry and whether it passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    pub label: String,
    pub passed: bool,
}

impl CheckItem {
    fn new(label: &str, passed: bool) -> Self {
        Self {
            label: label.to_string(),
            passed,
        }
    }
}

/// Pass counts against totals for the three stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_passed: usize,
    pub files_total: usize,
    pub content_passed: usize,
    pub content_total: usize,
    pub frameworks_passed: usize,
    pub frameworks_total: usize,
    pub all_passed: bool,
}

/// Diagnostic environment details; never affect the verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub os: String,
    /// Name and version of this installer build
    pub installer: String,
    pub directory: String,
}

impl SystemInfo {
    pub fn detect(directory: &Path) -> Self {
        Self {
            os: format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH),
            installer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            directory: directory.display().to_string(),
        }
    }
}

/// Outcome of one verification pass
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    root: PathBuf,
    files: Vec<CheckItem>,
    content: Vec<CheckItem>,
    frameworks: Vec<CheckItem>,
    summary: Summary,
}

impl VerificationReport {
    fn new(
        root: PathBuf,
        files: Vec<CheckItem>,
        content: Vec<CheckItem>,
        frameworks: Vec<CheckItem>,
    ) -> Self {
        let passed = |items: &[CheckItem]| items.iter().filter(|i| i.passed).count();
        let (files_passed, content_passed, frameworks_passed) =
            (passed(&files), passed(&content), passed(&frameworks));
        let summary = Summary {
            files_passed,
            files_total: files.len(),
            content_passed,
            content_total: content.len(),
            frameworks_passed,
            frameworks_total: frameworks.len(),
            all_passed: files_passed == files.len()
                && content_passed == content.len()
                && frameworks_passed == frameworks.len(),
        };
        Self {
            root,
            files,
            content,
            frameworks,
            summary,
        }
    }

    pub fn files(&self) -> &[CheckItem] {
        &self.files
    }

    pub fn content(&self) -> &[CheckItem] {
        &self.content
    }

    pub fn frameworks(&self) -> &[CheckItem] {
        &self.frameworks
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn all_passed(&self) -> bool {
        self.summary.all_passed
    }

    /// Verdict line without decoration
    pub fn verdict(&self) -> &'static str {
        if self.all_passed() { ALL_PASSED } else { SOME_FAILED }
    }

    /// Pretty-printed JSON form of the report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the human-readable report.
    pub fn render(&self, out: &mut impl Write, info: &SystemInfo, color: bool) -> io::Result<()> {
        let rule = "========================================";
        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(out, "  {} v{} - Installation Verification", PACK_NAME, VERSION)?;
        writeln!(out, "{rule}")?;
        writeln!(out)?;

        writeln!(out, "Stage 1: Checking Required Files...")?;
        render_items(out, &self.files, color)?;
        writeln!(out)?;
        writeln!(out, "Stage 2: Validating Content Quality...")?;
        render_items(out, &self.content, color)?;
        writeln!(out)?;
        writeln!(out, "Stage 3: Verifying Framework Integration...")?;
        render_items(out, &self.frameworks, color)?;

        writeln!(out)?;
        writeln!(out, "Stage 4: System Information")?;
        writeln!(out, "  OS: {}", info.os)?;
        writeln!(out, "  Installer: {}", info.installer)?;
        writeln!(out, "  Directory: {}", info.directory)?;

        let s = &self.summary;
        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Verification Summary:")?;
        writeln!(out, "  Files: {}/{} passed", s.files_passed, s.files_total)?;
        writeln!(out, "  Content: {}/{} passed", s.content_passed, s.content_total)?;
        writeln!(
            out,
            "  Frameworks: {}/{} integrated",
            s.frameworks_passed, s.frameworks_total
        )?;
        writeln!(out, "{rule}")?;
        writeln!(out)?;

        if self.all_passed() {
            writeln!(out, "Status: {} {}", self.verdict(), mark(true, color))?;
        } else {
            writeln!(out, "Status: {} {}", self.verdict(), mark(false, color))?;
            writeln!(out)?;
            writeln!(out, "Troubleshooting:")?;
            for hint in FAILURE_HINTS {
                writeln!(out, "  {hint}")?;
            }
        }
        Ok(())
    }
}

fn mark(passed: bool, color: bool) -> String {
    match (passed, color) {
        (true, true) => "✓".green().to_string(),
        (false, true) => "✗".red().to_string(),
        (true, false) => "✓".to_string(),
        (false, false) => "✗".to_string(),
    }
}

fn render_items(out: &mut impl Write, items: &[CheckItem], color: bool) -> io::Result<()> {
    for item in items {
        writeln!(out, "  [{}] {}", mark(item.passed, color), item.label)?;
    }
    Ok(())
}

/// Verify `root` against the standard checklist.
pub fn verify(root: &Path) -> VerificationReport {
    verify_with(root, &Checklist::standard())
}

/// Verify `root` against an explicit checklist.
pub fn verify_with(root: &Path, checklist: &Checklist<'_>) -> VerificationReport {
    let files: Vec<CheckItem> = checklist
        .files
        .iter()
        .map(|f| CheckItem::new(f, root.join(f).is_file()))
        .collect();

    // Only files that passed the existence stage are searched
    let scanned: Vec<ScannedFile> = checklist
        .files
        .iter()
        .zip(&files)
        .filter(|(_, item)| item.passed)
        .map(|(f, _)| ScannedFile::new(root.join(f)))
        .collect();

    let content = scan_markers(&scanned, checklist.content);
    let frameworks = scan_markers(&scanned, checklist.frameworks);

    VerificationReport::new(root.to_path_buf(), files, content, frameworks)
}

/// An existing required file whose contents are read at most once.
struct ScannedFile {
    path: PathBuf,
    text: OnceCell<Option<String>>,
}

impl ScannedFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            text: OnceCell::new(),
        }
    }

    fn contains(&self, marker: &str) -> bool {
        self.text
            .get_or_init(|| match std::fs::read(&self.path) {
                Ok(bytes) => Some(decode_lossy(&bytes)),
                Err(e) => {
                    debug!("Treating unreadable {} as empty: {}", self.path.display(), e);
                    None
                }
            })
            .as_deref()
            .is_some_and(|text| text.contains(marker))
    }
}

fn scan_markers(files: &[ScannedFile], markers: &[&str]) -> Vec<CheckItem> {
    markers
        .iter()
        .map(|marker| CheckItem::new(marker, files.iter().any(|f| f.contains(marker))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TEMPLATES;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn test_required_files_match_templates() {
        let paths: Vec<&str> = TEMPLATES.iter().map(|t| t.path).collect();
        assert_eq!(paths, REQUIRED_FILES);
    }

    #[test]
    fn test_embedded_pack_contains_every_marker() {
        for marker in CONTENT_MARKERS.iter().chain(FRAMEWORK_MARKERS) {
            assert!(
                TEMPLATES.iter().any(|t| t.content.contains(marker)),
                "no template mentions {marker}"
            );
        }
    }

    #[test]
    fn test_empty_directory_fails_everything() {
        let dir = tempfile::tempdir().unwrap();
        let report = verify(dir.path());
        let s = report.summary();
        assert_eq!((s.files_passed, s.files_total), (0, 4));
        assert_eq!((s.content_passed, s.content_total), (0, 4));
        assert_eq!((s.frameworks_passed, s.frameworks_total), (0, 5));
        assert!(!report.all_passed());
        assert_eq!(report.verdict(), SOME_FAILED);
    }

    #[test]
    fn test_markers_are_or_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let checklist = Checklist {
            files: &["a.md", "b.md"],
            content: &["alpha", "beta"],
            frameworks: &["gamma"],
        };
        write(dir.path(), "a.md", "alpha only");
        write(dir.path(), "b.md", "beta and gamma");

        let report = verify_with(dir.path(), &checklist);
        assert!(report.all_passed());
    }

    #[test]
    fn test_missing_file_is_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let checklist = Checklist {
            files: &["a.md", "sub/b.md"],
            content: &["alpha"],
            frameworks: &[],
        };
        // A directory at the required path does not count as a file
        std::fs::create_dir_all(dir.path().join("sub/b.md")).unwrap();
        write(dir.path(), "a.md", "nothing here");

        let report = verify_with(dir.path(), &checklist);
        assert_eq!(report.summary().files_passed, 1);
        assert!(!report.content()[0].passed);
    }

    #[test]
    fn test_bom_and_invalid_utf8_do_not_hide_markers() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = crate::encoding::encode_with_bom("Fabric ");
        bytes.extend_from_slice(b"\xFF OpenSkills");
        std::fs::write(dir.path().join("CLAUDE.md"), bytes).unwrap();

        let report = verify(dir.path());
        let found: Vec<&str> = report
            .frameworks()
            .iter()
            .filter(|i| i.passed)
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(found, ["Fabric", "OpenSkills"]);
    }

    #[test]
    fn test_render_plain_report() {
        let dir = tempfile::tempdir().unwrap();
        for t in &TEMPLATES {
            write(dir.path(), t.path, t.content);
        }
        let report = verify(dir.path());
        let info = SystemInfo {
            os: "linux (x86_64)".to_string(),
            installer: "powerpack 2.4.0".to_string(),
            directory: "/work".to_string(),
        };

        let mut out = Vec::new();
        report.render(&mut out, &info, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("  [✓] .github/copilot-instructions.md"));
        assert!(text.contains("  [✓] UI/UX Pro Max"));
        assert!(text.contains("Files: 4/4 passed"));
        assert!(text.contains("Content: 4/4 passed"));
        assert!(text.contains("Frameworks: 5/5 integrated"));
        assert!(text.contains("Status: ALL CHECKS PASSED ✓"));
        assert!(text.contains("  Installer: powerpack 2.4.0"));
        assert!(text.contains("  Directory: /work"));
        assert!(!text.contains("Troubleshooting"));
    }

    #[test]
    fn test_system_info_reports_installer_version() {
        let info = SystemInfo::detect(Path::new("/work"));
        assert_eq!(info.installer, format!("powerpack {VERSION}"));
        assert_eq!(info.directory, Path::new("/work").display().to_string());
        assert!(!info.os.is_empty());
    }

    #[test]
    fn test_render_failure_lists_hints() {
        let dir = tempfile::tempdir().unwrap();
        let report = verify(dir.path());
        let info = SystemInfo::detect(dir.path());

        let mut out = Vec::new();
        report.render(&mut out, &info, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("  [✗] CLAUDE.md"));
        assert!(text.contains("Status: SOME CHECKS FAILED ✗"));
        for hint in FAILURE_HINTS {
            assert!(text.contains(hint));
        }
    }

    #[test]
    fn test_report_serializes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let text = verify(dir.path()).to_json().unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["root"], dir.path().display().to_string());
        assert_eq!(json["summary"]["files_total"], 4);
        assert_eq!(json["summary"]["all_passed"], false);
        assert_eq!(json["frameworks"].as_array().unwrap().len(), 5);
    }
}
