//! Deploy script rendering
//!
//! Builds the script the resolved shell runs. The script carries the file-writing
//! policy for every template:
//! - Create the parent directory when it is missing
//! - Copy an existing target to `<path>.backup`, replacing any older backup
//! - Write a UTF-8 byte-order mark followed by the fixed content
//!
//! All writes run in one guarded sequence; the first failure stops the rest and
//! the script exits 1. Files written before the failure stay on disk.
//!
//! The run mode is never spliced into the script text. The child reads it from
//! `POWERPACK_SILENT` at run time.

use crate::encoding::BACKUP_SUFFIX;
use crate::error::{PowerPackError, Result};
use crate::shell::ShellFlavor;
use crate::templates::{PACK_NAME, TemplateFile, VERSION};

/// Environment variable carrying the run mode to the child (`1` = silent)
pub const SILENT_ENV: &str = "POWERPACK_SILENT";

/// Heredoc delimiter used by the POSIX renderer
const HEREDOC_DELIMITER: &str = "POWERPACK_EOF";

const BANNER_FEATURES: &[&str] = &[
    "Context Management (Claude 200K / Gemini 2M)",
    "Code Self-Execution (Playground-style)",
    "API Key Security",
    "Logging Standards",
    "Docker Best Practices",
    "CI/CD Pipeline Templates",
    "Performance Monitoring",
    "Auto Documentation",
];

/// Frameworks named in the completion banner
const BANNER_FRAMEWORKS: &[&str] = &[
    "Fabric (37.8k⭐) - AI Patterns",
    "Awesome Cursor Rules (36.7k⭐) - Best Practices",
    "Context Engineering - Project Structure",
    "OpenSkills - Security Standards",
    "UI/UX Pro Max - Design Principles",
];

const BANNER_MODELS: &[&str] = &[
    "Claude Sonnet 4.5 (200K context)",
    "Gemini 2.0 Flash (2M context)",
];

const BANNER_NEXT_STEPS: &[&str] = &[
    "1. Initialize Git: git init",
    "2. Write playground-style code (self-runnable)",
    "3. Use context summarization every 50 messages",
    "4. Read GIT_GUIDE.md for Git workflow",
];

const FAILURE_HINTS: &[&str] = &[
    "1. Run as Administrator",
    "2. Check disk space",
    "3. Verify write permissions",
];

/// Render the deploy script for `flavor` writing `templates` in order.
pub fn render(flavor: ShellFlavor, templates: &[TemplateFile]) -> Result<String> {
    match flavor {
        ShellFlavor::PowerShell => render_powershell(templates),
        ShellFlavor::Posix => render_posix(templates),
    }
}

fn banner_title() -> String {
    format!("{} v{} - Enhanced Edition", PACK_NAME, VERSION)
}

// ============================================================================
// PowerShell
// ============================================================================

/// Single-quoted PowerShell literal
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn ps_host(out: &mut String, indent: &str, text: &str, color: &str) {
    out.push_str(&format!(
        "{indent}Write-Host {} -ForegroundColor {color}\n",
        ps_quote(text)
    ));
}

fn ps_wait_key(out: &mut String, indent: &str, prompt: &str) {
    out.push_str(&format!("{indent}Write-Host ''\n"));
    ps_host(out, indent, prompt, "Gray");
    out.push_str(&format!(
        "{indent}if (-not [Console]::IsInputRedirected) {{ $null = $Host.UI.RawUI.ReadKey('NoEcho,IncludeKeyDown') }}\n"
    ));
}

fn render_powershell(templates: &[TemplateFile]) -> Result<String> {
    let mut out = String::new();
    out.push_str("$ErrorActionPreference = 'Stop'\n");
    out.push_str(&format!("$Silent = $env:{SILENT_ENV} -eq '1'\n\n"));

    out.push_str("function Smart-Write($path, $content) {\n");
    out.push_str("    $dir = Split-Path $path -Parent\n");
    out.push_str("    if ($dir -and !(Test-Path -LiteralPath $dir)) {\n");
    out.push_str("        New-Item -ItemType Directory -Path $dir -Force | Out-Null\n");
    out.push_str("    }\n");
    out.push_str("    if (Test-Path -LiteralPath $path) {\n");
    out.push_str(&format!(
        "        Copy-Item -LiteralPath $path -Destination ($path + {}) -Force\n",
        ps_quote(BACKUP_SUFFIX)
    ));
    out.push_str("    }\n");
    out.push_str("    $full = Join-Path (Get-Location) $path\n");
    out.push_str(
        "    [System.IO.File]::WriteAllText($full, $content, (New-Object System.Text.UTF8Encoding $true))\n",
    );
    out.push_str("}\n\n");

    for (i, template) in templates.iter().enumerate() {
        if template.content.lines().any(|line| line.starts_with("'@")) {
            return Err(PowerPackError::script(format!(
                "{} contains a here-string terminator",
                template.path
            )));
        }
        // The newline before the closing '@ is not part of the value
        out.push_str(&format!("$Content{i} = @'\n{}\n'@\n\n", template.content));
    }

    out.push_str("try {\n");
    for (i, template) in templates.iter().enumerate() {
        out.push_str(&format!(
            "    Smart-Write {} $Content{i}\n",
            ps_quote(template.path)
        ));
    }

    out.push_str("    if (-not $Silent) {\n");
    let ind = "        ";
    out.push_str(&format!("{ind}Write-Host ''\n"));
    ps_host(&mut out, ind, "========================================", "Green");
    ps_host(&mut out, ind, &format!("  {}", banner_title()), "Green");
    ps_host(&mut out, ind, "========================================", "Green");
    ps_host(&mut out, ind, "Files Created:", "Cyan");
    for template in templates {
        ps_host(&mut out, ind, &format!("  ✓ {}", template.path), "White");
    }
    ps_host(&mut out, ind, "New Features:", "Yellow");
    for feature in BANNER_FEATURES {
        ps_host(&mut out, ind, &format!("  ✓ {feature}"), "White");
    }
    ps_host(&mut out, ind, "Frameworks Integrated:", "Cyan");
    for framework in BANNER_FRAMEWORKS {
        ps_host(&mut out, ind, &format!("  • {framework}"), "White");
    }
    ps_host(&mut out, ind, "Optimized for:", "Magenta");
    for model in BANNER_MODELS {
        ps_host(&mut out, ind, &format!("  {model}"), "White");
    }
    ps_host(&mut out, ind, "Next Steps:", "Yellow");
    for step in BANNER_NEXT_STEPS {
        ps_host(&mut out, ind, &format!("  {step}"), "White");
    }
    ps_wait_key(&mut out, ind, "Press any key to continue...");
    out.push_str("    }\n");
    out.push_str("    exit 0\n");
    out.push_str("} catch {\n");
    out.push_str("    Write-Host ''\n");
    out.push_str("    Write-Host ('ERROR: ' + $_.Exception.Message) -ForegroundColor Red\n");
    ps_host(&mut out, "    ", "Troubleshooting:", "Yellow");
    for hint in FAILURE_HINTS {
        ps_host(&mut out, "    ", &format!("  {hint}"), "White");
    }
    out.push_str("    if (-not $Silent) {\n");
    ps_wait_key(&mut out, ind, "Press any key to exit...");
    out.push_str("    }\n");
    out.push_str("    exit 1\n");
    out.push_str("}\n");

    Ok(out)
}

// ============================================================================
// POSIX sh
// ============================================================================

/// Single-quoted sh literal
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn sh_say(out: &mut String, indent: &str, text: &str) {
    out.push_str(&format!("{indent}printf '%s\\n' {}\n", sh_quote(text)));
}

const POSIX_PRELUDE: &str = r#"current=''

smart_write() {
    current=$1
    dir=$(dirname -- "$1") || return 1
    if [ "$dir" != "." ] && [ ! -d "$dir" ]; then
        mkdir -p -- "$dir" || return 1
    fi
    if [ -e "$1" ]; then
        cp -f -- "$1" "$1__BACKUP__" || return 1
    fi
    { printf '\357\273\277' && cat; } > "$1" || return 1
}

wait_key() {
    printf '\n%s\n' "$1"
    [ -t 0 ] || return 0
    saved=$(stty -g 2>/dev/null) || { read -r _ || true; return 0; }
    stty -icanon -echo min 1 time 0 2>/dev/null
    dd bs=1 count=1 >/dev/null 2>&1
    stty "$saved" 2>/dev/null
    return 0
}

"#;

fn render_posix(templates: &[TemplateFile]) -> Result<String> {
    let mut out = String::from("# powerpack deploy script\n");
    out.push_str(&POSIX_PRELUDE.replace("__BACKUP__", BACKUP_SUFFIX));

    out.push_str("deploy_all() {\n");
    for template in templates {
        if template.content.lines().any(|line| line == HEREDOC_DELIMITER) {
            return Err(PowerPackError::script(format!(
                "{} contains the heredoc delimiter",
                template.path
            )));
        }
        if !template.content.ends_with('\n') {
            return Err(PowerPackError::script(format!(
                "{} must end with a newline",
                template.path
            )));
        }
        out.push_str(&format!(
            "    smart_write {} <<'{HEREDOC_DELIMITER}' || return 1\n{}{HEREDOC_DELIMITER}\n",
            sh_quote(template.path),
            template.content
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("if [ \"${{{SILENT_ENV}:-0}}\" = \"1\" ]; then silent=1; else silent=0; fi\n\n"));

    out.push_str("if deploy_all; then\n");
    out.push_str("    if [ \"$silent\" != \"1\" ]; then\n");
    let ind = "        ";
    out.push_str(&format!("{ind}printf '\\n'\n"));
    sh_say(&mut out, ind, "========================================");
    sh_say(&mut out, ind, &format!("  {}", banner_title()));
    sh_say(&mut out, ind, "========================================");
    sh_say(&mut out, ind, "Files Created:");
    for template in templates {
        sh_say(&mut out, ind, &format!("  ✓ {}", template.path));
    }
    sh_say(&mut out, ind, "New Features:");
    for feature in BANNER_FEATURES {
        sh_say(&mut out, ind, &format!("  ✓ {feature}"));
    }
    sh_say(&mut out, ind, "Frameworks Integrated:");
    for framework in BANNER_FRAMEWORKS {
        sh_say(&mut out, ind, &format!("  • {framework}"));
    }
    sh_say(&mut out, ind, "Optimized for:");
    for model in BANNER_MODELS {
        sh_say(&mut out, ind, &format!("  {model}"));
    }
    sh_say(&mut out, ind, "Next Steps:");
    for step in BANNER_NEXT_STEPS {
        sh_say(&mut out, ind, &format!("  {step}"));
    }
    out.push_str(&format!("{ind}wait_key 'Press any key to continue...'\n"));
    out.push_str("    fi\n");
    out.push_str("    exit 0\n");
    out.push_str("fi\n\n");

    out.push_str("printf '\\nERROR: could not write %s\\n' \"$current\" >&2\n");
    sh_say(&mut out, "", "Troubleshooting:");
    for hint in FAILURE_HINTS {
        sh_say(&mut out, "", &format!("  {hint}"));
    }
    out.push_str("if [ \"$silent\" != \"1\" ]; then\n");
    out.push_str("    wait_key 'Press any key to exit...'\n");
    out.push_str("fi\n");
    out.push_str("exit 1\n");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TEMPLATES;

    #[test]
    fn test_mode_is_read_from_environment() {
        for flavor in [ShellFlavor::PowerShell, ShellFlavor::Posix] {
            let script = render(flavor, &TEMPLATES).unwrap();
            assert!(script.contains(SILENT_ENV), "{flavor} script ignores {SILENT_ENV}");
        }
    }

    #[test]
    fn test_powershell_writes_every_template() {
        let script = render(ShellFlavor::PowerShell, &TEMPLATES).unwrap();
        for template in &TEMPLATES {
            assert!(script.contains(&format!("Smart-Write '{}'", template.path)));
        }
        // Invocation flags belong to the spawner, not the script body
        assert!(!script.contains("-NoProfile"));
        assert!(script.contains("UTF8Encoding $true"));
        assert!(script.contains("+ '.backup'"));
    }

    #[test]
    fn test_powershell_here_string_keeps_trailing_newline() {
        let template = TemplateFile {
            path: "a.md",
            content: "line one\nline two\n",
        };
        let script = render(ShellFlavor::PowerShell, &[template]).unwrap();
        assert!(script.contains("$Content0 = @'\nline one\nline two\n\n'@\n"));
    }

    #[test]
    fn test_powershell_rejects_terminator_in_payload() {
        let template = TemplateFile {
            path: "bad.md",
            content: "text\n'@\nmore\n",
        };
        let err = render(ShellFlavor::PowerShell, &[template]).unwrap_err();
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_posix_rejects_delimiter_in_payload() {
        let template = TemplateFile {
            path: "bad.md",
            content: "POWERPACK_EOF\n",
        };
        assert!(render(ShellFlavor::Posix, &[template]).is_err());
    }

    #[test]
    fn test_posix_rejects_payload_without_newline() {
        let template = TemplateFile {
            path: "bad.md",
            content: "no newline",
        };
        assert!(render(ShellFlavor::Posix, &[template]).is_err());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(ps_quote("it's"), "'it''s'");
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_banner_sections_in_both_flavors() {
        for flavor in [ShellFlavor::PowerShell, ShellFlavor::Posix] {
            let script = render(flavor, &TEMPLATES).unwrap();
            let headings = [
                "Files Created:",
                "New Features:",
                "Frameworks Integrated:",
                "Optimized for:",
                "Next Steps:",
            ];
            for heading in headings {
                assert!(script.contains(heading), "{flavor} banner lacks {heading}");
            }
            assert!(script.contains("  ✓ API Key Security"));
            assert!(script.contains("  • Fabric (37.8k⭐) - AI Patterns"));
            assert!(script.contains("4. Read GIT_GUIDE.md for Git workflow"));
        }
    }

    #[test]
    fn test_posix_backup_suffix_substituted() {
        let script = render(ShellFlavor::Posix, &TEMPLATES).unwrap();
        assert!(script.contains(r#"cp -f -- "$1" "$1.backup""#));
        assert!(!script.contains("__BACKUP__"));
    }
}
