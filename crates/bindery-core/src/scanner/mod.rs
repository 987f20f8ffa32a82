pub mod walk;

use std::path::PathBuf;

/// A file discovered during a scan. Ephemeral; lives only for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl ArtifactFile {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// A primary artifact (PDF) with its optional secondary counterpart (the
/// thumbnail sharing the same base filename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub primary: ArtifactFile,
    pub secondary: Option<ArtifactFile>,
}

pub use walk::discover_artifact_pairs;
