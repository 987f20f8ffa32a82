use std::fs;
use std::path::Path;
use tempfile::tempdir;

use bindery_core::report::UnmatchedReason;
use bindery_core::storage::Database;
use bindery_core::{AppConfig, Error, ImportEngine, SilentReporter};

fn make_config(root: &Path) -> AppConfig {
    AppConfig {
        import_root: root.to_string_lossy().into_owned(),
        ignore_patterns: vec![],
        match_threshold: 0.6,
        collection_bonus: 0.2,
        unmatched_display_cap: 25,
    }
}

/// Create a temp import tree with known outcomes.
/// Layout:
///   root/
///     PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf   ← matches, with thumbnail
///     PALM CD - Chuukese - Anapet me ewe chóón nááng.png
///     PALM - Printed [Trial version] - YAPESE - Beaq Ni Ba Moqon Ngea Ba Raan.pdf
///                                                          ← matches, no thumbnail
///     holiday_photos.pdf                                   ← parse failure
///     PALM - Kosraean - Sroal ac Srik.pdf                  ← no Kosraean records
///     PALM - Yapese - Completely Different Words Here.pdf  ← below threshold
fn create_import_tree(root: &Path) {
    fs::create_dir_all(root).unwrap();
    let files = [
        "PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf",
        "PALM CD - Chuukese - Anapet me ewe chóón nááng.png",
        "PALM - Printed [Trial version] - YAPESE - Beaq Ni Ba Moqon Ngea Ba Raan.pdf",
        "holiday_photos.pdf",
        "PALM - Kosraean - Sroal ac Srik.pdf",
        "PALM - Yapese - Completely Different Words Here.pdf",
    ];
    for name in files {
        fs::write(root.join(name), b"artifact bytes").unwrap();
    }
}

fn seed_catalog(db_path: &str) {
    let db = Database::open(db_path).unwrap();
    let chuukese = db.ensure_language("Chuukese").unwrap();
    let yapese = db.ensure_language("Yapese").unwrap();
    let palm_cd = db.ensure_collection("PALM CD").unwrap();

    db.insert_catalog_record("Anapet me ewe chóón nááng", chuukese, Some(palm_cd))
        .unwrap();
    db.insert_catalog_record("Beaq ni ba moqon ngea ba raan", yapese, None)
        .unwrap();
    db.insert_catalog_record("Nidipot kewe", chuukese, Some(palm_cd))
        .unwrap();
}

#[test]
fn test_full_reconciliation_pipeline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    create_import_tree(&root);

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_e2e.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let engine = ImportEngine::new(make_config(&root)).with_db_path(db_path_str);
    let summary = engine.run(&SilentReporter).unwrap();

    // 5 primary PDFs discovered (the PNG pairs with its PDF).
    assert_eq!(summary.files_discovered, 5);
    assert_eq!(summary.files_matched, 2);
    assert_eq!(summary.files_unmatched, 3);
    assert_eq!(summary.already_attached, 0);
    // Chuukese PDF + its thumbnail + the Yapese PDF.
    assert_eq!(summary.attachments_created, 3);

    let db = Database::open(db_path_str).unwrap();
    assert_eq!(db.count_attachments().unwrap(), 3);

    // Unmatched reasons are triagable.
    let reasons: Vec<(String, String)> = summary
        .unmatched
        .iter()
        .map(|e| (e.file_name.clone(), e.reason.as_str().to_string()))
        .collect();
    assert!(reasons.contains(&(
        "holiday_photos.pdf".to_string(),
        UnmatchedReason::ParseFailure.as_str().to_string()
    )));
    assert!(reasons.contains(&(
        "PALM - Kosraean - Sroal ac Srik.pdf".to_string(),
        UnmatchedReason::NoLanguageCandidates.as_str().to_string()
    )));
    assert!(reasons.contains(&(
        "PALM - Yapese - Completely Different Words Here.pdf".to_string(),
        UnmatchedReason::BelowThreshold.as_str().to_string()
    )));

    // Run row recorded as completed with matching counters.
    let runs = db.list_import_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "completed");
    assert_eq!(runs[0].files_discovered, 5);
    assert_eq!(runs[0].files_matched, 2);
    assert_eq!(runs[0].files_unmatched, 3);

    // Full unmatched list persisted for the run.
    let unmatched = db.get_unmatched_files(runs[0].id).unwrap();
    assert_eq!(unmatched.len(), 3);
}

#[test]
fn test_second_run_is_idempotent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    create_import_tree(&root);

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_idempotent.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let engine = ImportEngine::new(make_config(&root)).with_db_path(db_path_str);
    let first = engine.run(&SilentReporter).unwrap();
    assert_eq!(first.attachments_created, 3);

    // Same files, same catalog: nothing new is written, the matched pairs
    // report as already attached.
    let second = engine.run(&SilentReporter).unwrap();
    assert_eq!(second.files_matched, 2);
    assert_eq!(second.already_attached, 2);
    assert_eq!(second.attachments_created, 0);

    let db = Database::open(db_path_str).unwrap();
    assert_eq!(db.count_attachments().unwrap(), 3);

    // Each run is its own row.
    assert_eq!(db.list_import_runs(10).unwrap().len(), 2);
}

#[test]
fn test_attachment_flags_after_pipeline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf"),
        b"pdf",
    )
    .unwrap();
    fs::write(
        root.join("PALM CD - Chuukese - Anapet me ewe chóón nááng.png"),
        b"png",
    )
    .unwrap();

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_flags.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let engine = ImportEngine::new(make_config(&root)).with_db_path(db_path_str);
    engine.run(&SilentReporter).unwrap();

    let db = Database::open(db_path_str).unwrap();
    let candidates = db.catalog_candidates_by_language_prefix("Chuukese").unwrap();
    let record_id = candidates
        .iter()
        .find(|c| c.title == "Anapet me ewe chóón nááng")
        .unwrap()
        .record_id;

    let attachments = db.get_attachments_for_record(record_id).unwrap();
    assert_eq!(attachments.len(), 2);
    let document = attachments.iter().find(|a| a.kind == "document").unwrap();
    let thumbnail = attachments.iter().find(|a| a.kind == "thumbnail").unwrap();
    assert!(document.is_primary);
    assert!(thumbnail.is_primary);
    assert!(document.provenance.contains("automated import"));
}

#[test]
fn test_ignore_patterns_exclude_subtrees() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    create_import_tree(&root);
    let drafts = root.join("drafts");
    fs::create_dir_all(&drafts).unwrap();
    fs::write(
        drafts.join("PALM - Yapese - Beaq Ni Ba Moqon Ngea Ba Raan.pdf"),
        b"pdf",
    )
    .unwrap();

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_ignore.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let mut config = make_config(&root);
    config.ignore_patterns = vec!["**/drafts".to_string()];
    let engine = ImportEngine::new(config).with_db_path(db_path_str);
    let summary = engine.run(&SilentReporter).unwrap();

    assert_eq!(summary.files_discovered, 5);
}

#[test]
fn test_unreadable_root_is_fatal_before_any_run_row() {
    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_fatal.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let config = AppConfig {
        import_root: "/nonexistent/import/root".to_string(),
        ignore_patterns: vec![],
        match_threshold: 0.6,
        collection_bonus: 0.2,
        unmatched_display_cap: 25,
    };
    let engine = ImportEngine::new(config).with_db_path(db_path_str);
    let result = engine.run(&SilentReporter);
    assert!(matches!(result, Err(Error::Io(_))));

    // Scanning failed before a run row could be created.
    let db = Database::open(db_path_str).unwrap();
    assert!(db.list_import_runs(10).unwrap().is_empty());
}

#[test]
fn test_unmatched_display_cap_limits_summary_not_storage() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    fs::create_dir_all(&root).unwrap();
    for i in 0..6 {
        fs::write(root.join(format!("unparseable_{i}.pdf")), b"pdf").unwrap();
    }

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_cap.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let mut config = make_config(&root);
    config.unmatched_display_cap = 2;
    let engine = ImportEngine::new(config).with_db_path(db_path_str);
    let summary = engine.run(&SilentReporter).unwrap();

    assert_eq!(summary.files_unmatched, 6);
    assert_eq!(summary.unmatched.len(), 2);

    let db = Database::open(db_path_str).unwrap();
    let runs = db.list_import_runs(1).unwrap();
    assert_eq!(db.get_unmatched_files(runs[0].id).unwrap().len(), 6);
}

#[test]
fn test_run_cancellation() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("incoming");
    create_import_tree(&root);

    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_cancel.db");
    let db_path_str = db_path.to_str().unwrap();
    seed_catalog(db_path_str);

    let engine = ImportEngine::new(make_config(&root)).with_db_path(db_path_str);

    // run() resets the token at start, so cancel from another thread after
    // a tiny delay.
    let cancel_token = engine.cancel_token();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(1));
        cancel_token.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    let result = engine.run(&SilentReporter);
    handle.join().unwrap();

    // On a tiny dataset the run may finish before the cancel lands; both
    // outcomes are acceptable, corruption is not.
    match result {
        Ok(_) => {}
        Err(Error::Cancelled) => {
            let db = Database::open(db_path_str).unwrap();
            let runs = db.list_import_runs(1).unwrap();
            assert_eq!(runs[0].status, "cancelled");
        }
        Err(other) => panic!("Unexpected error: {:?}", other),
    }
}
