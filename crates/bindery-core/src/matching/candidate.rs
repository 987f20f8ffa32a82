use crate::matching::filename::ParsedFileInfo;
use crate::matching::normalize::normalize;
use crate::matching::score::similarity;
use crate::storage::models::CatalogCandidate;
use crate::storage::Database;
use ahash::AHashMap;
use tracing::{debug, trace};

/// Best catalog candidate for a parsed file, with its ranking score.
/// The score is the raw ranking value and may exceed 1.0 once the collection
/// bonus is applied; clamp with `score::display_score` before showing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub record_id: i64,
    pub title: String,
    pub score: f64,
}

/// Select the best catalog record for a parsed file.
///
/// Hard constraint first: a candidate's language name must start with the
/// parsed language label (case-insensitive). No surviving candidate means no
/// match, regardless of how similar any title is.
///
/// Among survivors the titles are compared in normalized form plus the
/// collection bonus. A candidate replaces the running best only when its
/// score is strictly greater than both the threshold and the best so far,
/// so equal scores keep the first-seen candidate and repeated runs over the
/// same candidate order pick the same record.
pub fn find_best_match<'a>(
    parsed: &ParsedFileInfo,
    candidates: &'a [CatalogCandidate],
    threshold: f64,
    collection_bonus: f64,
) -> Option<Match> {
    let language_label = parsed.language.to_lowercase();
    let target_title = normalize(&parsed.title);
    let tag = parsed.collection.display_name().to_lowercase();

    let mut best: Option<(&'a CatalogCandidate, f64)> = None;

    for candidate in candidates {
        if !candidate
            .language_name
            .to_lowercase()
            .starts_with(&language_label)
        {
            continue;
        }

        let mut score = similarity(&target_title, &normalize(&candidate.title));
        if let Some(collection_name) = &candidate.collection_name {
            if collection_name.to_lowercase().contains(&tag) {
                score += collection_bonus;
            }
        }
        trace!(
            "candidate {} '{}' scored {:.3} against '{}'",
            candidate.record_id,
            candidate.title,
            score,
            parsed.source_name,
        );

        if score > threshold && best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    best.map(|(candidate, score)| Match {
        record_id: candidate.record_id,
        title: candidate.title.clone(),
        score,
    })
}

/// Per-run cache of catalog candidates keyed by the parsed language label.
///
/// One database fetch per distinct label; the matching phase then runs over
/// the cached lists without touching the connection. Owned by the engine and
/// passed by reference; invalidation is an explicit call, not a process
/// restart.
#[derive(Default)]
pub struct CandidateCache {
    by_language: AHashMap<String, Vec<CatalogCandidate>>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and cache the candidate list for a language label, if it is not
    /// already present.
    pub fn warm(&mut self, db: &Database, language_label: &str) -> Result<(), crate::Error> {
        let key = language_label.to_lowercase();
        if self.by_language.contains_key(&key) {
            return Ok(());
        }
        let candidates = db.catalog_candidates_by_language_prefix(language_label)?;
        debug!(
            "Cached {} catalog candidates for language '{}'",
            candidates.len(),
            language_label,
        );
        self.by_language.insert(key, candidates);
        Ok(())
    }

    pub fn candidates(&self, language_label: &str) -> &[CatalogCandidate] {
        self.by_language
            .get(&language_label.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop every cached list. Call after catalog mutations within a process.
    pub fn invalidate(&mut self) {
        self.by_language.clear();
    }

    pub fn len(&self) -> usize {
        self.by_language.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_language.is_empty()
    }
}
