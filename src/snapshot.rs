use crate::record::ResearcherProfile;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bumped whenever the on-disk layout changes; older files refuse to load.
const FORMAT_VERSION: u32 = 1;

/// The immutable bundle the whole query path runs against: fitted
/// vectorizer, researcher-level document matrix, and the full profile
/// collection in roster order.
///
/// Written exactly once by the corpus builder and loaded read-only at
/// process start; no call path mutates it afterwards, so it is shared
/// across threads without locking.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    format_version: u32,
    pub vectorizer: TfidfVectorizer,
    /// One row per researcher, aligned with `researcher_names`.
    pub document_matrix: Vec<SparseVector>,
    /// Aligned with `researcher_names`; all lookups are positional.
    pub profiles: Vec<ResearcherProfile>,
    pub researcher_names: Vec<String>,
}

/// Roster-level counters, for the stats endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub researchers: usize,
    pub works: usize,
    pub vocabulary_terms: usize,
}

impl Snapshot {
    pub(crate) fn new(
        vectorizer: TfidfVectorizer,
        document_matrix: Vec<SparseVector>,
        profiles: Vec<ResearcherProfile>,
    ) -> Self {
        let researcher_names = profiles.iter().map(|p| p.name.clone()).collect();
        Self {
            format_version: FORMAT_VERSION,
            vectorizer,
            document_matrix,
            profiles,
            researcher_names,
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profile(&self, index: usize) -> &ResearcherProfile {
        &self.profiles[index]
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            researchers: self.profiles.len(),
            works: self.profiles.iter().map(|p| p.works.len()).sum(),
            vocabulary_terms: self.vectorizer.vocabulary_len(),
        }
    }

    /// Write the snapshot as a single gzip-compressed bincode artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create snapshot file {}", path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        bincode::serialize_into(&mut encoder, self)
            .with_context(|| format!("failed to serialize snapshot to {}", path.display()))?;
        let mut writer = encoder
            .finish()
            .with_context(|| format!("failed to finish snapshot stream {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to flush snapshot to {}", path.display()))?;
        Ok(())
    }

    /// Load a snapshot, failing fast on a missing, corrupt, or
    /// incompatible file. The query engine never runs without one.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open snapshot file {}", path.display()))?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let snapshot: Snapshot = bincode::deserialize_from(decoder)
            .with_context(|| format!("snapshot file {} is corrupt", path.display()))?;

        if snapshot.format_version != FORMAT_VERSION {
            bail!(
                "snapshot file {} has format version {}, expected {}",
                path.display(),
                snapshot.format_version,
                FORMAT_VERSION
            );
        }
        let rows = snapshot.document_matrix.len();
        if rows != snapshot.profiles.len() || rows != snapshot.researcher_names.len() {
            bail!(
                "snapshot file {} is inconsistent: {} matrix rows, {} profiles, {} names",
                path.display(),
                rows,
                snapshot.profiles.len(),
                snapshot.researcher_names.len()
            );
        }

        tracing::info!(
            researchers = rows,
            vocabulary_terms = snapshot.vectorizer.vocabulary_len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusBuilder;
    use crate::record::PublicationRecord;

    fn tiny_snapshot() -> Snapshot {
        let records = vec![
            (
                "Dr. Robot".to_string(),
                vec![PublicationRecord::new("Social robots and humans".to_string())
                    .with_doi("https://doi.org/10.1/a".to_string())],
            ),
            (
                "Dr. Stats".to_string(),
                vec![PublicationRecord::new("Survey statistics methods".to_string())
                    .with_doi("https://doi.org/10.1/b".to_string())],
            ),
        ];
        CorpusBuilder::new().build(records)
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("snapshot.bin.gz");

        let snapshot = tiny_snapshot();
        snapshot.save(&path)?;
        let loaded = Snapshot::load(&path)?;

        assert_eq!(loaded.researcher_names, snapshot.researcher_names);
        assert_eq!(loaded.len(), 2);

        // Re-vectorizing the same text after the round trip ranks identically
        let query = "social robots";
        let before = snapshot.vectorizer.transform(query);
        let after = loaded.vectorizer.transform(query);
        for (a, b) in snapshot.document_matrix.iter().zip(&loaded.document_matrix) {
            assert_eq!(before.cosine(a), after.cosine(b));
        }
        Ok(())
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = Snapshot::load("/nonexistent/snapshot.bin.gz");
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_file_is_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("snapshot.bin.gz");
        std::fs::write(&path, b"not a snapshot")?;
        assert!(Snapshot::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_stats() {
        let snapshot = tiny_snapshot();
        let stats = snapshot.stats();
        assert_eq!(stats.researchers, 2);
        assert_eq!(stats.works, 2);
        assert!(stats.vocabulary_terms > 0);
    }
}
