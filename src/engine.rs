use crate::normalizer::Normalizer;
use crate::record::PublicationRecord;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// How researcher-level relevance is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    /// Cosine between the query and the researcher's aggregate document.
    #[default]
    DocumentSimilarity,
    /// Mean of the query's cosine against each of the researcher's papers.
    /// A materially different ordering, kept as an explicit alternative.
    MeanPaperSimilarity,
}

/// Options for one recommendation call.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub top_researchers: usize,
    pub top_papers: usize,
    pub strategy: RankingStrategy,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_researchers: 3,
            top_papers: 3,
            strategy: RankingStrategy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Non-positive top-N counts are signaled, never silently clamped.
    #[error("{name} must be at least 1, got {value}")]
    InvalidArgument { name: &'static str, value: usize },
}

/// One ranked paper, linkable by DOI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMatch {
    pub doi: String,
    pub score: f64,
}

/// One ranked researcher with their most relevant papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub researcher: String,
    pub score: f64,
    pub top_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub top_papers: Vec<PaperMatch>,
}

/// Scoring backend the engine ranks with. TF-IDF is the canonical
/// implementation; a dense-embedding backend slots behind the same trait
/// without touching the engine.
pub trait TextRanker: Send + Sync {
    /// Score the (already normalized) query against every researcher row,
    /// in roster order.
    fn researcher_scores(&self, query: &str) -> Vec<f64>;

    /// Score the query against arbitrary normalized texts in the same
    /// fitted space.
    fn text_scores(&self, query: &str, texts: &[String]) -> Vec<f64>;
}

/// TF-IDF backend over the snapshot's fitted vector space.
pub struct TfidfRanker {
    snapshot: Arc<Snapshot>,
}

impl TfidfRanker {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }
}

impl TextRanker for TfidfRanker {
    fn researcher_scores(&self, query: &str) -> Vec<f64> {
        let query_vector = self.snapshot.vectorizer.transform(query);
        self.snapshot
            .document_matrix
            .iter()
            .map(|row| query_vector.cosine(row))
            .collect()
    }

    fn text_scores(&self, query: &str, texts: &[String]) -> Vec<f64> {
        let query_vector = self.snapshot.vectorizer.transform(query);
        self.snapshot
            .vectorizer
            .transform_batch(texts)
            .iter()
            .map(|vector| query_vector.cosine(vector))
            .collect()
    }
}

/// The query engine: a pure read over an injected immutable snapshot.
/// Every call is stateless and side-effect-free, so concurrent calls
/// against the same snapshot need no coordination.
pub struct RecommendEngine {
    snapshot: Arc<Snapshot>,
    ranker: Box<dyn TextRanker>,
    normalizer: Normalizer,
}

impl RecommendEngine {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        let ranker = Box::new(TfidfRanker::new(snapshot.clone()));
        Self {
            snapshot,
            ranker,
            normalizer: Normalizer::new(),
        }
    }

    /// Swap in an alternative scoring backend.
    pub fn with_ranker(mut self, ranker: Box<dyn TextRanker>) -> Self {
        self.ranker = ranker;
        self
    }

    /// Use a non-default normalizer. Must match the one the corpus was
    /// built with, or query and documents end up in different token forms.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Rank researchers against free-text interests, then rank each
    /// selected researcher's DOI-bearing papers against the same query.
    ///
    /// An empty or wholly out-of-vocabulary query is legal: it vectorizes
    /// to zero, scores 0.0 everywhere, and the fixed roster order decides
    /// the result. Requested counts clip silently to what is available.
    pub fn recommend(
        &self,
        query: &str,
        options: &RecommendOptions,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if options.top_researchers == 0 {
            return Err(RecommendError::InvalidArgument {
                name: "top_researchers",
                value: options.top_researchers,
            });
        }
        if options.top_papers == 0 {
            return Err(RecommendError::InvalidArgument {
                name: "top_papers",
                value: options.top_papers,
            });
        }

        let normalized_query = self.normalizer.normalize(query);

        let scores = match options.strategy {
            RankingStrategy::DocumentSimilarity => {
                self.ranker.researcher_scores(&normalized_query)
            }
            RankingStrategy::MeanPaperSimilarity => self.mean_paper_scores(&normalized_query),
        };

        let results = top_indices(&scores, options.top_researchers)
            .into_iter()
            .map(|index| {
                let profile = self.snapshot.profile(index);
                Recommendation {
                    researcher: profile.name.clone(),
                    score: scores[index],
                    top_keywords: profile.top_keywords.clone(),
                    summary: profile.summary.clone(),
                    top_papers: self.rank_papers(
                        &normalized_query,
                        &profile.works,
                        options.top_papers,
                    ),
                }
            })
            .collect();

        Ok(results)
    }

    /// Alternative researcher relevance: the mean of per-paper cosines.
    /// A researcher with no papers scores 0.0.
    fn mean_paper_scores(&self, normalized_query: &str) -> Vec<f64> {
        self.snapshot
            .profiles
            .iter()
            .map(|profile| {
                if profile.works.is_empty() {
                    return 0.0;
                }
                let texts: Vec<String> = profile
                    .works
                    .iter()
                    .map(|work| self.normalizer.normalize(&work.matching_text()))
                    .collect();
                let scores = self.ranker.text_scores(normalized_query, &texts);
                scores.iter().sum::<f64>() / scores.len() as f64
            })
            .collect()
    }

    /// Paper-level ranking within one researcher. Records without a DOI
    /// are excluded entirely; a researcher whose papers all lack one
    /// contributes an empty list, not an error.
    fn rank_papers(
        &self,
        normalized_query: &str,
        works: &[PublicationRecord],
        top_papers: usize,
    ) -> Vec<PaperMatch> {
        let eligible: Vec<&PublicationRecord> =
            works.iter().filter(|work| work.has_doi()).collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let texts: Vec<String> = eligible
            .iter()
            .map(|work| self.normalizer.normalize(&work.matching_text()))
            .collect();
        let scores = self.ranker.text_scores(normalized_query, &texts);

        top_indices(&scores, top_papers)
            .into_iter()
            .map(|index| PaperMatch {
                doi: eligible[index].doi.clone().unwrap_or_default(),
                score: scores[index],
            })
            .collect()
    }
}

/// Indices of the `n` highest scores, descending. Equal scores keep
/// their original relative order (earlier index wins), which makes every
/// ranking reproducible. Clips to the available count.
fn top_indices(scores: &[f64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(n);
    order
}
