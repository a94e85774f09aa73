//! Grandfathered files exempt from the cutoff-date rule.

use std::path::Path;

use crate::error::{Error, Result};

/// Lines of the allowlist file, each used as a substring pattern.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    lines: Vec<String>,
}

impl Allowlist {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Allowlist {
            path: path.to_path_buf(),
            source,
        })?;
        let allowlist = Self::parse(&content);
        log::debug!(
            "loaded {} allowlist entries from {}",
            allowlist.len(),
            path.display()
        );
        Ok(allowlist)
    }

    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if `path` occurs anywhere inside some line.
    ///
    /// Deliberately loose: a line may carry a comment after the path, and a
    /// line naming `src/Legacy/Foo.php` also covers `Legacy/Foo.php`.
    pub fn contains(&self, path: &str) -> bool {
        self.lines.iter().any(|line| line.contains(path))
    }
}
