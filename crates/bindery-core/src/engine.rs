use crate::config::AppConfig;
use crate::error::Error;
use crate::matching::candidate::{find_best_match, CandidateCache, Match};
use crate::matching::filename::{self, ParsedFileInfo};
use crate::matching::score::display_score;
use crate::progress::ProgressReporter;
use crate::report::{ImportReport, RunPhase, UnmatchedEntry, UnmatchedReason};
use crate::scanner::{self, ArtifactPair};
use crate::storage::{AttachOutcome, Database};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub struct ImportEngine {
    config: AppConfig,
    db_path: String,
    cancel: Arc<AtomicBool>,
}

/// Final summary of one reconciliation run. The unmatched list is capped to
/// the configured display limit; the counters are exact and the full list is
/// persisted per run for triage.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: i64,
    pub scan_duration: Duration,
    pub match_duration: Duration,
    pub attach_duration: Duration,
    pub files_discovered: usize,
    pub files_matched: usize,
    pub files_unmatched: usize,
    pub already_attached: usize,
    pub attachments_created: usize,
    pub unmatched: Vec<UnmatchedEntry>,
}

/// Per-file result of the parse+match phases, before any write happens.
enum FileOutcome {
    Matched(Match),
    Unmatched(UnmatchedReason),
}

impl ImportEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            db_path: "bindery.db".to_string(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    /// Token for cooperative cancellation. Checked between files; a
    /// cancelled run leaves every already-attached file intact.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Run the full reconciliation pipeline:
    /// 1. Scan the import root for primary/secondary artifact pairs
    /// 2. Parse filenames and warm the per-language candidate cache
    /// 3. Match files to catalog records in parallel (pure, in-memory)
    /// 4. Attach matches serially, idempotently, one transaction per file
    /// 5. Persist and return the run summary
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunSummary, Error> {
        self.cancel.store(false, Ordering::Relaxed);
        let mut phase = RunPhase::Scanning;

        // Phase 1: Scan. An unreadable root fails here, before any run row
        // exists.
        info!("Scanning import root {}...", self.config.import_root);
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let ignore_patterns: Vec<&str> = self
            .config
            .ignore_patterns
            .iter()
            .map(|s| s.as_str())
            .collect();
        let pairs =
            scanner::discover_artifact_pairs(&self.config.import_root, &ignore_patterns)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(pairs.len(), scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s — {} primary artifacts",
            scan_duration.as_secs_f64(),
            pairs.len(),
        );

        let db = Database::open(&self.db_path)?;
        let run_id = db.create_import_run(&self.config.import_root)?;

        // Phase 2: Parse filenames, then fetch candidates once per distinct
        // language. The cache is warmed serially because the connection
        // stays on this thread; matching below never touches it.
        phase = phase.advance(RunPhase::Parsing)?;
        let match_start = Instant::now();
        reporter.on_match_start(pairs.len());
        let parsed: Vec<Option<ParsedFileInfo>> = pairs
            .iter()
            .map(|pair| filename::parse(&pair.primary.file_name))
            .collect();

        let mut cache = CandidateCache::new();
        for info in parsed.iter().flatten() {
            if self.is_cancelled() {
                db.cancel_import_run(run_id)?;
                return Err(Error::Cancelled);
            }
            cache.warm(&db, &info.language)?;
        }
        debug!("Candidate cache warmed for {} language label(s)", cache.len());

        // Phase 3: Match. Pure over the warmed cache, so files fan out
        // across threads; collect() preserves file order.
        phase = phase.advance(RunPhase::Matching)?;
        let total = pairs.len();
        let processed = AtomicUsize::new(0);
        let outcomes: Vec<FileOutcome> = parsed
            .par_iter()
            .map(|info| {
                let outcome = match info {
                    None => FileOutcome::Unmatched(UnmatchedReason::ParseFailure),
                    Some(info) => {
                        let candidates = cache.candidates(&info.language);
                        if candidates.is_empty() {
                            FileOutcome::Unmatched(UnmatchedReason::NoLanguageCandidates)
                        } else {
                            match find_best_match(
                                info,
                                candidates,
                                self.config.match_threshold,
                                self.config.collection_bonus,
                            ) {
                                Some(matched) => FileOutcome::Matched(matched),
                                None => {
                                    FileOutcome::Unmatched(UnmatchedReason::BelowThreshold)
                                }
                            }
                        }
                    }
                };
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_match_progress(done, total);
                outcome
            })
            .collect();
        let match_duration = match_start.elapsed();
        let matched_count = outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Matched(_)))
            .count();
        reporter.on_match_complete(matched_count, match_duration.as_secs_f64());
        debug!(
            "Matching completed in {:.2}s — {} of {} files matched",
            match_duration.as_secs_f64(),
            matched_count,
            total,
        );

        // Phase 4: Attach. Serial and in filename order, so "first primary
        // wins" is stable; each file is one transaction and a failed write
        // demotes that file to unmatched without stopping the run.
        phase = phase.advance(RunPhase::Attaching)?;
        let attach_start = Instant::now();
        reporter.on_attach_start(total);
        let mut report = ImportReport::new(total, self.config.unmatched_display_cap);
        let mut unmatched_rows: Vec<UnmatchedEntry> = Vec::new();

        for (index, (pair, outcome)) in pairs.iter().zip(outcomes.iter()).enumerate() {
            if self.is_cancelled() {
                db.cancel_import_run(run_id)?;
                return Err(Error::Cancelled);
            }

            match outcome {
                FileOutcome::Unmatched(reason) => {
                    debug!("Unmatched ({}): {}", reason, pair.primary.file_name);
                    record_unmatched(&mut report, &mut unmatched_rows, pair, *reason, None);
                }
                FileOutcome::Matched(matched) => {
                    debug!(
                        "Matched '{}' -> record {} '{}' (score {:.2})",
                        pair.primary.file_name,
                        matched.record_id,
                        matched.title,
                        display_score(matched.score),
                    );
                    let provenance = format!(
                        "Matched during automated import (score {:.2})",
                        display_score(matched.score),
                    );
                    match db.attach_artifacts(
                        matched.record_id,
                        &pair.primary,
                        pair.secondary.as_ref(),
                        &provenance,
                    ) {
                        Ok(AttachOutcome::Created { attachment_count }) => {
                            report.record_matched(attachment_count);
                        }
                        Ok(AttachOutcome::AlreadyAttached) => {
                            report.record_already_attached();
                        }
                        Err(e) => {
                            error!(
                                "Failed to attach '{}' to record {}: {}",
                                pair.primary.file_name, matched.record_id, e,
                            );
                            record_unmatched(
                                &mut report,
                                &mut unmatched_rows,
                                pair,
                                UnmatchedReason::WriteFailure,
                                Some(e.to_string()),
                            );
                        }
                    }
                }
            }
            reporter.on_attach_progress(index + 1, total);
        }
        let attach_duration = attach_start.elapsed();
        reporter.on_attach_complete(report.attachments_created(), attach_duration.as_secs_f64());

        // Phase 5: Report.
        phase = phase.advance(RunPhase::Reported)?;
        db.insert_unmatched_files(run_id, &unmatched_rows)?;
        db.complete_import_run(
            run_id,
            report.files_discovered() as i64,
            report.files_matched() as i64,
            report.files_unmatched() as i64,
        )?;
        info!(
            "Import run {} {}: {} discovered, {} matched, {} unmatched",
            run_id,
            phase.as_str(),
            report.files_discovered(),
            report.files_matched(),
            report.files_unmatched(),
        );

        Ok(RunSummary {
            run_id,
            scan_duration,
            match_duration,
            attach_duration,
            files_discovered: report.files_discovered(),
            files_matched: report.files_matched(),
            files_unmatched: report.files_unmatched(),
            already_attached: report.already_attached(),
            attachments_created: report.attachments_created(),
            unmatched: report.unmatched().to_vec(),
        })
    }
}

fn record_unmatched(
    report: &mut ImportReport,
    unmatched_rows: &mut Vec<UnmatchedEntry>,
    pair: &ArtifactPair,
    reason: UnmatchedReason,
    detail: Option<String>,
) {
    report.record_unmatched(&pair.primary.file_name, reason, detail.as_deref());
    unmatched_rows.push(UnmatchedEntry {
        file_name: pair.primary.file_name.clone(),
        reason,
        detail,
    });
}
