use crate::error::Error;
use serde::Serialize;

/// Why a discovered file ended the run unmatched. One bucket for reporting,
/// distinguishable for triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedReason {
    ParseFailure,
    NoLanguageCandidates,
    BelowThreshold,
    WriteFailure,
}

impl UnmatchedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedReason::ParseFailure => "parse-failure",
            UnmatchedReason::NoLanguageCandidates => "no-language-candidates",
            UnmatchedReason::BelowThreshold => "below-threshold",
            UnmatchedReason::WriteFailure => "write-failure",
        }
    }
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run lifecycle. Files move through Parsing → Matching → Attaching
/// individually (exiting early to unmatched); the run as a whole advances
/// strictly forward through these phases and terminates at Reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Scanning,
    Parsing,
    Matching,
    Attaching,
    Reported,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Scanning => "scanning",
            RunPhase::Parsing => "parsing",
            RunPhase::Matching => "matching",
            RunPhase::Attaching => "attaching",
            RunPhase::Reported => "reported",
        }
    }

    /// Advance to the next phase. Only the forward edges of
    /// Scanning → Parsing → Matching → Attaching → Reported are legal;
    /// anything else is a programming error surfaced as `Error::Phase`.
    pub fn advance(self, to: RunPhase) -> Result<RunPhase, Error> {
        let legal = matches!(
            (self, to),
            (RunPhase::Scanning, RunPhase::Parsing)
                | (RunPhase::Parsing, RunPhase::Matching)
                | (RunPhase::Matching, RunPhase::Attaching)
                | (RunPhase::Attaching, RunPhase::Reported)
        );
        if legal {
            Ok(to)
        } else {
            Err(Error::Phase {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

/// A file left unmatched by the run, with its reason code. Write failures
/// carry the underlying storage error text for triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedEntry {
    pub file_name: String,
    pub reason: UnmatchedReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregates per-file outcomes for one run. Pure counting; the unmatched
/// list kept for display is capped while the counters stay exact.
#[derive(Debug)]
pub struct ImportReport {
    display_cap: usize,
    files_discovered: usize,
    files_matched: usize,
    files_unmatched: usize,
    already_attached: usize,
    attachments_created: usize,
    unmatched: Vec<UnmatchedEntry>,
}

impl ImportReport {
    pub fn new(files_discovered: usize, display_cap: usize) -> Self {
        Self {
            display_cap,
            files_discovered,
            files_matched: 0,
            files_unmatched: 0,
            already_attached: 0,
            attachments_created: 0,
            unmatched: Vec::new(),
        }
    }

    pub fn record_matched(&mut self, attachments_created: usize) {
        self.files_matched += 1;
        self.attachments_created += attachments_created;
    }

    pub fn record_already_attached(&mut self) {
        self.files_matched += 1;
        self.already_attached += 1;
    }

    pub fn record_unmatched(
        &mut self,
        file_name: &str,
        reason: UnmatchedReason,
        detail: Option<&str>,
    ) {
        self.files_unmatched += 1;
        if self.unmatched.len() < self.display_cap {
            self.unmatched.push(UnmatchedEntry {
                file_name: file_name.to_string(),
                reason,
                detail: detail.map(str::to_string),
            });
        }
    }

    pub fn files_discovered(&self) -> usize {
        self.files_discovered
    }

    pub fn files_matched(&self) -> usize {
        self.files_matched
    }

    pub fn files_unmatched(&self) -> usize {
        self.files_unmatched
    }

    pub fn already_attached(&self) -> usize {
        self.already_attached
    }

    pub fn attachments_created(&self) -> usize {
        self.attachments_created
    }

    pub fn unmatched(&self) -> &[UnmatchedEntry] {
        &self.unmatched
    }
}
