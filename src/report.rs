//! Markdown report rendering for pull request comments.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use chrono::NaiveDate;

use crate::eval::{FileVerdict, RequiredStatus};
use crate::error::{Error, Result};
use crate::lint::LintTool;

pub const CLEAN_MESSAGE: &str = "Cheers! This file is clean!";

const ERROR_EMOJI: &str = ":red_circle:";
const WARNING_EMOJI: &str = ":yellow_circle:";
const CLEAN_EMOJI: &str = ":green_circle:";

/// Inputs for the parts of a report that do not depend on a single file.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub tool: &'a LintTool,
    pub banner: &'a str,
    pub cutoff: NaiveDate,
    /// File name of the allowlist as shown to readers.
    pub allowlist_name: &'a str,
}

/// Title line plus the informational banner.
pub fn header(ctx: &ReportContext) -> String {
    let mut out = format!("## {} Report :broom:\n\n", ctx.tool.full_name);
    if !ctx.banner.is_empty() {
        out.push_str(ctx.banner);
        out.push_str("\n\n");
    }
    out
}

fn emoji(verdict: &FileVerdict) -> &'static str {
    match (verdict.is_clean, verdict.required_status) {
        (true, _) => CLEAN_EMOJI,
        (false, RequiredStatus::MustPass) => ERROR_EMOJI,
        (false, RequiredStatus::Exempt) => WARNING_EMOJI,
    }
}

/// Collapsible block for one file. Must-pass files are marked with `*`.
pub fn file_section(verdict: &FileVerdict) -> String {
    let marker = match verdict.required_status {
        RequiredStatus::MustPass => "*",
        RequiredStatus::Exempt => "",
    };
    let body = if verdict.is_clean {
        CLEAN_MESSAGE
    } else {
        verdict.report.as_str()
    };

    format!(
        "<details><summary>{} {}{marker}</summary>\n\n```text\n\n{body}\n\n```\n\n</details>\n\n",
        emoji(verdict),
        verdict.path,
    )
}

/// Cutoff note and pending allowlist additions; only for the style checker.
pub fn footer(ctx: &ReportContext, additions: &[String]) -> String {
    if !ctx.tool.enforces_cutoff {
        return String::new();
    }

    let mut out = format!(
        "\\* Files created after *{}* OR in {} must pass {} linting.",
        ctx.cutoff.format("%B %d, %Y"),
        ctx.allowlist_name,
        ctx.tool.name.to_uppercase(),
    );
    if !additions.is_empty() {
        out.push_str(&format!(
            "\n\n### :exclamation: These files must be added to `{}`:\n\n",
            ctx.allowlist_name
        ));
        let items: Vec<String> = additions.iter().map(|path| format!("- {path}")).collect();
        out.push_str(&items.join("\n"));
    }
    out.push('\n');
    out
}

/// Scoped temporary file that accumulates the report.
///
/// The backing file is unlinked at creation and released on drop, whichever
/// path the run exits through.
pub struct ReportBuffer {
    file: File,
}

impl ReportBuffer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            file: tempfile::tempfile().map_err(Error::ReportBuffer)?,
        })
    }

    pub fn push(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .map_err(Error::ReportBuffer)
    }

    /// Read back everything written so far.
    pub fn finish(mut self) -> Result<String> {
        let mut text = String::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_string(&mut text))
            .map_err(Error::ReportBuffer)?;
        Ok(text)
    }
}

/// Render the complete report: header, one section per verdict, footer.
pub fn render(
    ctx: &ReportContext,
    verdicts: &[FileVerdict],
    additions: &[String],
) -> Result<String> {
    let mut buffer = ReportBuffer::new()?;
    buffer.push(&header(ctx))?;
    for verdict in verdicts {
        buffer.push(&file_section(verdict))?;
    }
    buffer.push(&footer(ctx, additions))?;
    buffer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lint::ToolRegistry;

    fn registry() -> ToolRegistry {
        ToolRegistry::from_config(&Config::default_config()).unwrap()
    }

    fn ctx<'a>(tool: &'a LintTool) -> ReportContext<'a> {
        ReportContext {
            tool,
            banner: "Be kind.",
            cutoff: NaiveDate::from_ymd_opt(2021, 6, 14).unwrap(),
            allowlist_name: "cleanfiles.txt",
        }
    }

    #[test]
    fn header_names_tool() {
        let reg = registry();
        let h = header(&ctx(reg.get("phpmd").unwrap()));
        assert_eq!(h, "## PHP Mess Detector Report :broom:\n\nBe kind.\n\n");
    }

    #[test]
    fn header_without_banner() {
        let reg = registry();
        let mut c = ctx(reg.get("phpcs").unwrap());
        c.banner = "";
        assert_eq!(header(&c), "## CodeSniffer Report :broom:\n\n");
    }

    #[test]
    fn must_pass_with_findings_is_red_and_starred() {
        let v = FileVerdict::new("src/A.php", "E1", "E1", 0, false);
        let s = file_section(&v);
        assert!(s.starts_with("<details><summary>:red_circle: src/A.php*</summary>"));
        assert!(s.contains("```text\n\nE1\n\n```"));
        assert!(s.ends_with("</details>\n\n"));
    }

    #[test]
    fn exempt_with_findings_is_yellow_without_star() {
        let v = FileVerdict::new("src/B.php", "W", "W", -3, false);
        let s = file_section(&v);
        assert!(s.starts_with("<details><summary>:yellow_circle: src/B.php</summary>"));
    }

    #[test]
    fn clean_file_is_green_with_message() {
        let must = FileVerdict::new("src/C.php", "", "", 4, false);
        let s = file_section(&must);
        assert!(s.starts_with("<details><summary>:green_circle: src/C.php*</summary>"));
        assert!(s.contains(CLEAN_MESSAGE));

        let exempt = FileVerdict::new("src/D.php", "", "", -4, false);
        assert!(file_section(&exempt).starts_with("<details><summary>:green_circle: src/D.php<"));
    }

    #[test]
    fn section_shows_normalized_report() {
        let v = FileVerdict::new("src/E.php", "\x1b[31mbad\x1b[0m", "bad", 1, false);
        let s = file_section(&v);
        assert!(s.contains("\n\nbad\n\n"));
        assert!(!s.contains('\x1b'));
    }

    #[test]
    fn footer_only_for_cutoff_tool() {
        let reg = registry();
        assert_eq!(footer(&ctx(reg.get("phpstan").unwrap()), &["a.php".into()]), "");
        assert_eq!(footer(&ctx(reg.get("phpmd").unwrap()), &[]), "");
    }

    #[test]
    fn footer_names_cutoff_date() {
        let reg = registry();
        let f = footer(&ctx(reg.get("phpcs").unwrap()), &[]);
        assert_eq!(
            f,
            "\\* Files created after *June 14, 2021* OR in cleanfiles.txt must pass PHPCS linting.\n"
        );
    }

    #[test]
    fn footer_lists_additions() {
        let reg = registry();
        let f = footer(
            &ctx(reg.get("phpcs").unwrap()),
            &["src/Old.php".into(), "src/Older.php".into()],
        );
        assert!(f.contains("### :exclamation: These files must be added to `cleanfiles.txt`:"));
        assert!(f.ends_with("- src/Old.php\n- src/Older.php\n"));
    }

    #[test]
    fn buffer_round_trip() {
        let mut buf = ReportBuffer::new().unwrap();
        buf.push("one ").unwrap();
        buf.push("two").unwrap();
        assert_eq!(buf.finish().unwrap(), "one two");
    }

    #[test]
    fn render_orders_header_sections_footer() {
        let reg = registry();
        let verdicts = vec![
            FileVerdict::new("added.php", "", "", 2, false),
            FileVerdict::new("modified.php", "E", "E", 2, false),
        ];
        let text = render(&ctx(reg.get("phpcs").unwrap()), &verdicts, &[]).unwrap();
        let h = text.find("## CodeSniffer Report").unwrap();
        let a = text.find("added.php").unwrap();
        let m = text.find("modified.php").unwrap();
        let f = text.find("must pass PHPCS linting").unwrap();
        assert!(h < a && a < m && m < f);
    }
}
