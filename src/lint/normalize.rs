//! Output normalizers: turn a tool's captured text into "findings or empty".

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::Normalizer;

/// Matches 7-bit C1 escapes and CSI sequences (colors, cursor movement).
static ANSI_ESCAPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ANSI escape regex is valid")
});

/// Leaves output untouched.
pub struct PassThrough;

impl Normalizer for PassThrough {
    fn normalize(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Maps a tool's literal "no issues" message to an empty report.
///
/// Needed for tools that always print something, even on success.
pub struct CleanSentinel {
    sentinel: String,
}

impl CleanSentinel {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }
}

impl Normalizer for CleanSentinel {
    fn normalize(&self, raw: &str) -> String {
        if raw == self.sentinel {
            String::new()
        } else {
            raw.to_string()
        }
    }
}

/// Removes ANSI color and style escapes so the text renders in markdown.
///
/// Stripping one escape can join a stray ESC to the following bytes and form
/// a new escape, so passes repeat until nothing matches.
pub struct StripAnsi;

impl Normalizer for StripAnsi {
    fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        while ANSI_ESCAPE_REGEX.is_match(&text) {
            text = ANSI_ESCAPE_REGEX.replace_all(&text, "").into_owned();
        }
        text
    }
}
