use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Sparse row vector over the fitted vocabulary, entries sorted by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.values.is_empty()
    }

    /// Dot product of two index-sorted sparse vectors (merge walk).
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut sum = 0.0;
        let mut i = 0;
        let mut j = 0;
        while i < self.indices.len() && j < other.indices.len() {
            if self.indices[i] < other.indices[j] {
                i += 1;
            } else if self.indices[i] > other.indices[j] {
                j += 1;
            } else {
                sum += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            }
        }
        sum
    }

    /// Cosine similarity of two L2-normalized vectors: their dot product,
    /// clamped into [0, 1] against rounding drift. A zero vector scores
    /// exactly 0.0 against everything, never NaN.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        self.dot(other).clamp(0.0, 1.0)
    }

    fn l2_normalize(&mut self) {
        let norm = self.values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }
}

/// TF-IDF model over unigrams and bigrams.
///
/// `fit` runs exactly once, over the researcher documents; the vocabulary
/// is frozen afterwards. `transform` is a pure function of its input and
/// the fitted state: terms unseen at fit time contribute no weight, and a
/// wholly out-of-vocabulary text legally produces an all-zero vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights over the document collection.
    /// Smoothed IDF: ln((1 + n) / (1 + df)) + 1, so no term weighs zero
    /// and an all-empty collection still fits cleanly.
    pub fn fit(documents: &[String]) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let mut seen: HashSet<String> = HashSet::new();
            for term in ngrams(document) {
                seen.insert(term);
            }
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        // Columns in lexicographic term order keeps the fit deterministic
        let mut terms: Vec<(String, usize)> = document_frequency.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let total = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (column, (term, df)) in terms.into_iter().enumerate() {
            vocabulary.insert(term, column);
            idf.push(((1.0 + total) / (1.0 + df as f64)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vectorize one text against the fitted vocabulary: raw term counts
    /// weighted by IDF, L2-normalized. Zero rows stay zero.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in ngrams(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut indices: Vec<usize> = counts.keys().copied().collect();
        indices.sort_unstable();
        let values = indices
            .iter()
            .map(|&column| counts[&column] * self.idf[column])
            .collect();

        let mut vector = SparseVector { indices, values };
        vector.l2_normalize();
        vector
    }

    pub fn transform_batch(&self, texts: &[String]) -> Vec<SparseVector> {
        texts.iter().map(|text| self.transform(text)).collect()
    }
}

/// Whitespace unigrams plus adjacent-pair bigrams of normalized text.
fn ngrams(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut grams: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
    for pair in tokens.windows(2) {
        grams.push(format!("{} {}", pair[0], pair[1]));
    }
    grams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_ngrams_include_bigrams() {
        let grams = ngrams("social robot communication");
        assert!(grams.contains(&"social".to_string()));
        assert!(grams.contains(&"social robot".to_string()));
        assert!(grams.contains(&"robot communication".to_string()));
        assert_eq!(grams.len(), 5);
    }

    #[test]
    fn test_self_similarity_is_one() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["apple banana", "banana cherry"]));
        let vector = vectorizer.transform("apple banana");
        assert!((vector.cosine(&vector) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_terms_yield_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["apple banana", "banana cherry"]));
        let vector = vectorizer.transform("durian elderberry");
        assert!(vector.is_zero());

        let other = vectorizer.transform("apple");
        assert_eq!(vector.cosine(&other), 0.0);
    }

    #[test]
    fn test_empty_text_yields_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["apple banana"]));
        assert!(vectorizer.transform("").is_zero());
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["apple banana cherry", "banana cherry"]));
        let vector = vectorizer.transform("apple banana cherry");
        let norm: f64 = vector.values.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        // "banana" appears everywhere, "apple" in one document only
        let vectorizer =
            TfidfVectorizer::fit(&docs(&["apple banana", "banana cherry", "banana fig"]));
        let apple = vectorizer.transform("apple");
        let query = vectorizer.transform("apple banana");
        let banana = vectorizer.transform("banana");
        assert!(query.cosine(&apple) > query.cosine(&banana));
    }

    #[test]
    fn test_fit_tolerates_empty_documents() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["", "apple banana", ""]));
        assert!(vectorizer.transform("").is_zero());
        assert!(!vectorizer.transform("apple").is_zero());
    }

    #[test]
    fn test_transform_is_pure() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["apple banana", "banana cherry"]));
        let before = vectorizer.vocabulary_len();
        let first = vectorizer.transform("apple unknown banana");
        let second = vectorizer.transform("apple unknown banana");
        assert_eq!(first, second);
        assert_eq!(vectorizer.vocabulary_len(), before);
    }
}
