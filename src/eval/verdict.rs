/// Whether a file is held to a clean report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequiredStatus {
    /// First committed on/after the cutoff, or grandfathered via the allowlist.
    MustPass,
    Exempt,
}

impl RequiredStatus {
    pub fn from_facts(days_since_cutoff: i64, allowlisted: bool) -> Self {
        if days_since_cutoff >= 0 || allowlisted {
            RequiredStatus::MustPass
        } else {
            RequiredStatus::Exempt
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RequiredStatus::MustPass => "must-pass",
            RequiredStatus::Exempt => "exempt",
        }
    }
}

/// Classification of one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVerdict {
    pub path: String,
    /// Tool output as captured.
    pub raw_report: String,
    /// Tool output after normalization; empty when clean.
    pub report: String,
    pub is_clean: bool,
    pub days_since_cutoff: i64,
    pub allowlisted: bool,
    pub required_status: RequiredStatus,
    /// Clean, predates the cutoff, and missing from the allowlist.
    pub needs_allowlisting: bool,
}

impl FileVerdict {
    pub fn new(
        path: impl Into<String>,
        raw_report: impl Into<String>,
        report: impl Into<String>,
        days_since_cutoff: i64,
        allowlisted: bool,
    ) -> Self {
        let report = report.into();
        let is_clean = report.is_empty();
        Self {
            path: path.into(),
            raw_report: raw_report.into(),
            report,
            is_clean,
            days_since_cutoff,
            allowlisted,
            required_status: RequiredStatus::from_facts(days_since_cutoff, allowlisted),
            needs_allowlisting: is_clean && days_since_cutoff < 0 && !allowlisted,
        }
    }
}

/// Failure counts per required status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub must_pass: usize,
    pub exempt: usize,
}

impl RunTally {
    pub fn record(&mut self, status: RequiredStatus) {
        match status {
            RequiredStatus::MustPass => self.must_pass += 1,
            RequiredStatus::Exempt => self.exempt += 1,
        }
    }

    pub fn get(&self, status: RequiredStatus) -> usize {
        match status {
            RequiredStatus::MustPass => self.must_pass,
            RequiredStatus::Exempt => self.exempt,
        }
    }

    /// Overall verdict for the run.
    ///
    /// With `exempt_findings_fail` off, only the must-pass bucket and pending
    /// allowlist additions gate the run.
    pub fn passed(&self, additions: &[String], exempt_findings_fail: bool) -> bool {
        self.must_pass == 0
            && additions.is_empty()
            && (!exempt_findings_fail || self.exempt == 0)
    }
}
