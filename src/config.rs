use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Format of `settings.cutoff_date`.
pub const CUTOFF_DATE_FORMAT: &str = "%Y-%m-%d";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub settings: Settings,
    #[serde(default)]
    pub tools: BTreeMap<String, ToolConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Reference branch that changed files are diffed against.
    pub base_branch: String,
    /// Only paths ending in this suffix are checked.
    pub extension: String,
    /// Files first committed on or after this date must pass the style checker.
    pub cutoff_date: String,
    /// Grandfathered file list, one substring pattern per line.
    pub allowlist_path: String,
    /// Owner prefix joined with `--repo` to form `owner/repo`.
    pub namespace: String,
    pub default_repo: String,
    pub default_tool: String,
    pub api_url: String,
    #[serde(default)]
    pub banner: String,
    /// When false, findings in exempt files do not fail the run.
    #[serde(default = "default_true")]
    pub exempt_findings_fail: bool,
}

fn default_true() -> bool {
    true
}

/// Post-processing applied to a tool's captured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeKind {
    #[default]
    None,
    /// Exact match against `clean_sentinel` means no findings.
    Sentinel,
    /// Remove ANSI color/style escape sequences.
    StripAnsi,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolConfig {
    pub full_name: String,
    /// Argument vector; the `FILE` token is replaced by the checked path.
    pub command: Vec<String>,
    #[serde(default)]
    pub normalize: NormalizeKind,
    #[serde(default)]
    pub clean_sentinel: Option<String>,
    /// Marks the style checker whose report carries the cutoff footer.
    #[serde(default)]
    pub enforces_cutoff: bool,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    replace_tools: bool,
    #[serde(default)]
    tools: BTreeMap<String, ToolConfig>,
    #[serde(default)]
    remove_tools: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    base_branch: Option<String>,
    extension: Option<String>,
    cutoff_date: Option<String>,
    allowlist_path: Option<String>,
    namespace: Option<String>,
    default_repo: Option<String>,
    default_tool: Option<String>,
    api_url: Option<String>,
    banner: Option<String>,
    exempt_findings_fail: Option<bool>,
}

// ── Merge logic ──

/// Merge overlay tools into the base table.
/// In replace mode: overlay tools replace the defaults entirely.
/// In merge mode: remove listed names first, then insert (overriding by name).
fn merge_tools(
    base: &mut BTreeMap<String, ToolConfig>,
    add: BTreeMap<String, ToolConfig>,
    remove: &[String],
    replace: bool,
) {
    if replace {
        *base = add;
    } else {
        base.retain(|name, _| !remove.contains(name));
        base.extend(add);
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl Settings {
    /// The parsed cutoff date.
    pub fn cutoff(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.cutoff_date, CUTOFF_DATE_FORMAT).map_err(|e| {
            Error::Config(format!("cutoff_date {:?}: {e}", self.cutoff_date))
        })
    }

    /// Allowlist location with `~` and environment variables expanded.
    pub fn allowlist_file(&self) -> PathBuf {
        match shellexpand::full(&self.allowlist_path) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => PathBuf::from(&self.allowlist_path),
        }
    }

    /// Allowlist file name as shown in reports.
    pub fn allowlist_name(&self) -> &str {
        Path::new(&self.allowlist_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.allowlist_path)
    }

    /// Fully-qualified `namespace/repo` identifier.
    pub fn full_repo(&self, repo: &str) -> String {
        format!("{}/{}", self.namespace, repo)
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge ~/.config/checkcode/config.toml (if exists)
    /// 3. Merge ./.checkcode.toml (if exists)
    /// 4. Merge `extra` (if given)
    ///
    /// Overlays that fail to parse are reported and skipped. An explicitly
    /// requested `extra` file that cannot be read is an error.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_config();

        let mut overlays = Vec::new();
        if let Some(home) = std::env::var_os("HOME") {
            overlays.push(Path::new(&home).join(".config/checkcode/config.toml"));
        }
        overlays.push(PathBuf::from(".checkcode.toml"));

        for path in &overlays {
            if let Ok(content) = std::fs::read_to_string(path) {
                config.merge_file(path, &content);
            }
        }

        if let Some(path) = extra {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            config.merge_file(path, &content);
        }

        config.settings.cutoff()?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path, content: &str) {
        match toml::from_str::<ConfigOverlay>(content) {
            Ok(overlay) => {
                log::debug!("merging config overlay {}", path.display());
                self.apply_overlay(overlay);
            }
            Err(e) => log::warn!("config parse error in {}: {e}", path.display()),
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        let settings = &mut self.settings;
        override_with(&mut settings.base_branch, s.base_branch);
        override_with(&mut settings.extension, s.extension);
        override_with(&mut settings.cutoff_date, s.cutoff_date);
        override_with(&mut settings.allowlist_path, s.allowlist_path);
        override_with(&mut settings.namespace, s.namespace);
        override_with(&mut settings.default_repo, s.default_repo);
        override_with(&mut settings.default_tool, s.default_tool);
        override_with(&mut settings.api_url, s.api_url);
        override_with(&mut settings.banner, s.banner);
        override_with(&mut settings.exempt_findings_fail, s.exempt_findings_fail);

        merge_tools(
            &mut self.tools,
            overlay.tools,
            &overlay.remove_tools,
            overlay.replace_tools,
        );
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
