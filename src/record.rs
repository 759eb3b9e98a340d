use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single publication as it arrives from a bibliographic export.
///
/// Abstracts arrive either as plain text or as an inverted index
/// (word -> occurrence positions), the compact encoding used by
/// OpenAlex-style APIs. Records without a DOI are still indexed but
/// cannot appear in paper-level results, since there is nothing to link to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    #[serde(default)]
    pub cited_by_count: Option<u64>,
}

impl PublicationRecord {
    pub fn new(title: String) -> Self {
        Self {
            title,
            doi: None,
            abstract_text: None,
            abstract_inverted_index: None,
            cited_by_count: None,
        }
    }

    pub fn with_doi(mut self, doi: String) -> Self {
        self.doi = Some(doi);
        self
    }

    pub fn with_abstract(mut self, text: String) -> Self {
        self.abstract_text = Some(text);
        self
    }

    pub fn with_inverted_abstract(mut self, index: HashMap<String, Vec<usize>>) -> Self {
        self.abstract_inverted_index = Some(index);
        self
    }

    /// Linear abstract text: plain text when the export carries it,
    /// otherwise reconstructed from the inverted index. Missing both
    /// means an empty abstract, never an error.
    pub fn plain_abstract(&self) -> String {
        if let Some(text) = &self.abstract_text {
            return text.clone();
        }
        match &self.abstract_inverted_index {
            Some(index) => reconstruct_abstract(index),
            None => String::new(),
        }
    }

    /// The full matching text of this paper (title + abstract).
    pub fn matching_text(&self) -> String {
        format!("{} {}", self.title, self.plain_abstract())
    }

    /// Whether this record can be linked in ranked results.
    pub fn has_doi(&self) -> bool {
        self.doi.as_deref().map_or(false, |d| !d.trim().is_empty())
    }
}

/// Rebuild linear text from an inverted index: every (position, word)
/// pair sorted ascending by position, words joined in that order.
pub fn reconstruct_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut positioned: Vec<(usize, &str)> = Vec::new();
    for (word, positions) in index {
        for &pos in positions {
            positioned.push((pos, word.as_str()));
        }
    }
    // Ties on position sort by word, keeping the output deterministic
    positioned.sort_unstable();
    positioned
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything known about one researcher: their publications, the
/// aggregate normalized document they are matched on, and the metadata
/// shown alongside a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearcherProfile {
    pub name: String,
    pub works: Vec<PublicationRecord>,
    /// Concatenation of per-paper normalized text, built once at corpus time.
    pub document: String,
    /// Up to ten most frequent normalized units across the works.
    pub top_keywords: Vec<String>,
    /// Optional curated free-text description, an alternative projection
    /// to the keyword list.
    #[serde(default)]
    pub summary: Option<String>,
}
