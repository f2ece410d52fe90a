//! Embedded rule-file payloads.
//!
//! The four files the deploy script materializes. Bodies are opaque documentation
//! text compiled into the binary; nothing here parses or substitutes them.

/// Pack version label shown in banners and reports
pub const VERSION: &str = "2.4.0";

/// Human-readable pack name
pub const PACK_NAME: &str = "AI Power Pack";

/// A fixed output path paired with its fixed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the deploy directory, `/`-separated
    pub path: &'static str,
    /// Content written after the byte-order mark
    pub content: &'static str,
}

/// The deployed files, in write order.
pub const TEMPLATES: [TemplateFile; 4] = [
    TemplateFile {
        path: "CLAUDE.md",
        content: include_str!("../templates/CLAUDE.md"),
    },
    TemplateFile {
        path: "INITIAL.md",
        content: include_str!("../templates/INITIAL.md"),
    },
    TemplateFile {
        path: ".cursorrules",
        content: include_str!("../templates/cursorrules"),
    },
    TemplateFile {
        path: ".github/copilot-instructions.md",
        content: include_str!("../templates/copilot-instructions.md"),
    },
];

/// Look up a template by its relative output path
pub fn find(path: &str) -> Option<&'static TemplateFile> {
    TEMPLATES.iter().find(|t| t.path == path)
}
