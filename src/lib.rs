// Re-export main components
pub mod api;
pub mod corpus;
pub mod engine;
pub mod normalizer;
pub mod record;
pub mod snapshot;
pub mod vectorizer;

// Re-export commonly used types
pub use corpus::{load_raw_export, parse_raw_export, CorpusBuilder};
pub use engine::{
    PaperMatch, RankingStrategy, Recommendation, RecommendEngine, RecommendError,
    RecommendOptions, TextRanker, TfidfRanker,
};
pub use normalizer::Normalizer;
pub use record::{PublicationRecord, ResearcherProfile};
pub use snapshot::{Snapshot, SnapshotStats};
pub use vectorizer::{SparseVector, TfidfVectorizer};

// Re-export error types
pub use anyhow::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_basic_workflow() -> Result<()> {
        // Build a corpus from two researchers
        let records = vec![
            (
                "Dr. Robot".to_string(),
                vec![
                    PublicationRecord::new("Social robots in human communication".to_string())
                        .with_doi("https://doi.org/10.1/robots".to_string()),
                ],
            ),
            (
                "Dr. Stats".to_string(),
                vec![
                    PublicationRecord::new("Quantitative survey methodology".to_string())
                        .with_doi("https://doi.org/10.1/stats".to_string()),
                ],
            ),
        ];
        let snapshot = Arc::new(CorpusBuilder::new().build(records));

        // Query
        let engine = RecommendEngine::new(snapshot);
        let results = engine.recommend("social robots", &RecommendOptions::default())?;

        assert_eq!(results[0].researcher, "Dr. Robot");
        assert!(!results[0].top_papers.is_empty());

        Ok(())
    }
}
