use crate::normalizer::Normalizer;
use crate::record::{PublicationRecord, ResearcherProfile};
use crate::snapshot::Snapshot;
use crate::vectorizer::TfidfVectorizer;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Keywords kept per researcher.
const TOP_KEYWORDS: usize = 10;

/// Offline builder: turns ordered (researcher, works) pairs into the
/// immutable snapshot the query engine runs against. Runs once.
pub struct CorpusBuilder {
    normalizer: Normalizer,
    summaries: HashMap<String, String>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::new(),
            summaries: HashMap::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Curated free-text descriptions (researcher name -> text), filled
    /// into the profiles alongside the computed keyword lists.
    pub fn with_summaries(mut self, summaries: HashMap<String, String>) -> Self {
        self.summaries = summaries;
        self
    }

    /// Build the snapshot. Input order is the persisted roster order;
    /// every later lookup is positional against it.
    pub fn build(&self, records: Vec<(String, Vec<PublicationRecord>)>) -> Snapshot {
        let mut profiles = Vec::with_capacity(records.len());
        for (name, works) in records {
            profiles.push(self.build_profile(name, works));
        }

        let documents: Vec<String> = profiles.iter().map(|p| p.document.clone()).collect();
        let vectorizer = TfidfVectorizer::fit(&documents);
        let document_matrix = vectorizer.transform_batch(&documents);

        tracing::info!(
            researchers = profiles.len(),
            vocabulary_terms = vectorizer.vocabulary_len(),
            "corpus built"
        );
        Snapshot::new(vectorizer, document_matrix, profiles)
    }

    /// One researcher: reconstruct and normalize every paper, accumulate
    /// unit frequencies for the keyword list, join the per-paper strings
    /// into the aggregate document. A researcher with no usable text gets
    /// an empty document and no keywords, and still occupies their row.
    fn build_profile(&self, name: String, works: Vec<PublicationRecord>) -> ResearcherProfile {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        let mut parts: Vec<String> = Vec::new();

        for work in &works {
            let units = self.normalizer.units(&work.matching_text());
            for unit in &units {
                if !counts.contains_key(unit) {
                    first_seen.push(unit.clone());
                }
                *counts.entry(unit.clone()).or_insert(0) += 1;
            }
            if !units.is_empty() {
                parts.push(units.join(" "));
            }
        }

        let summary = self.summaries.get(&name).cloned();
        ResearcherProfile {
            top_keywords: top_keywords(&counts, &first_seen),
            document: parts.join(" "),
            summary,
            name,
            works,
        }
    }
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Most frequent units, ties broken by first-encountered order.
fn top_keywords(counts: &HashMap<String, usize>, first_seen: &[String]) -> Vec<String> {
    let mut ranked: Vec<(usize, usize, &String)> = first_seen
        .iter()
        .enumerate()
        .map(|(order, unit)| (*counts.get(unit).unwrap_or(&0), order, unit))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.truncate(TOP_KEYWORDS);
    ranked.into_iter().map(|(_, _, unit)| unit.clone()).collect()
}

/// Load a bibliographic export: a JSON object keyed by researcher name,
/// each value an array of work records. `.gz` files are decompressed on
/// the fly. Key order in the file becomes the roster order.
pub fn load_raw_export<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Vec<PublicationRecord>)>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open export file {}", path.display()))?;

    let mut raw = String::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(BufReader::new(file))
            .read_to_string(&mut raw)
            .with_context(|| format!("failed to decompress export file {}", path.display()))?;
    } else {
        BufReader::new(file)
            .read_to_string(&mut raw)
            .with_context(|| format!("failed to read export file {}", path.display()))?;
    }

    parse_raw_export(&raw)
}

/// Parse the export body, preserving researcher key order.
pub fn parse_raw_export(json: &str) -> Result<Vec<(String, Vec<PublicationRecord>)>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).context("export is not a JSON object keyed by researcher")?;

    let mut records = Vec::with_capacity(map.len());
    for (name, value) in map {
        let works: Vec<PublicationRecord> = serde_json::from_value(value)
            .with_context(|| format!("invalid work records for researcher {name:?}"))?;
        records.push((name, works));
    }
    Ok(records)
}

/// Optional sidecar: researcher name -> curated free-text summary.
pub fn load_summaries<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open summaries file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("summaries file {} is not a name -> text object", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(title: &str, doi: Option<&str>) -> PublicationRecord {
        let record = PublicationRecord::new(title.to_string());
        match doi {
            Some(doi) => record.with_doi(doi.to_string()),
            None => record,
        }
    }

    #[test]
    fn test_build_preserves_input_order() {
        let records = vec![
            ("Zoe".to_string(), vec![work("robot communication", None)]),
            ("Adam".to_string(), vec![work("media psychology", None)]),
            ("Mia".to_string(), vec![work("political journalism", None)]),
        ];
        let snapshot = CorpusBuilder::new().build(records);
        assert_eq!(snapshot.researcher_names, vec!["Zoe", "Adam", "Mia"]);
        assert_eq!(snapshot.document_matrix.len(), 3);
    }

    #[test]
    fn test_keywords_by_frequency_then_first_seen() {
        let records = vec![(
            "A".to_string(),
            vec![
                work("robot robot robot media", None),
                work("media journalism", None),
            ],
        )];
        let snapshot = CorpusBuilder::new().build(records);
        let keywords = &snapshot.profile(0).top_keywords;
        assert_eq!(keywords[0], "robot");
        assert_eq!(keywords[1], "media");
        // "journalism" ties with nothing left; first-seen order decides the rest
        assert!(keywords.contains(&"journal".to_string()));
    }

    #[test]
    fn test_keywords_capped_at_ten() {
        let titles =
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike";
        let records = vec![("A".to_string(), vec![work(titles, None)])];
        let snapshot = CorpusBuilder::new().build(records);
        assert_eq!(snapshot.profile(0).top_keywords.len(), 10);
    }

    #[test]
    fn test_researcher_without_usable_text() {
        let empty = PublicationRecord::new(String::new());
        let records = vec![
            ("Empty".to_string(), vec![empty]),
            ("Full".to_string(), vec![work("social robots", None)]),
        ];
        let snapshot = CorpusBuilder::new().build(records);

        let profile = snapshot.profile(0);
        assert_eq!(profile.document, "");
        assert!(profile.top_keywords.is_empty());
        // The empty researcher still occupies their row in the matrix
        assert_eq!(snapshot.document_matrix.len(), 2);
        assert!(snapshot.document_matrix[0].is_zero());
    }

    #[test]
    fn test_inverted_abstract_flows_into_document() {
        let mut index = HashMap::new();
        index.insert("robot".to_string(), vec![0_usize, 2]);
        index.insert("social".to_string(), vec![1]);
        let record = PublicationRecord::new("Machines".to_string()).with_inverted_abstract(index);

        let snapshot = CorpusBuilder::new().build(vec![("A".to_string(), vec![record])]);
        let document = &snapshot.profile(0).document;
        assert!(document.contains("robot"));
        assert!(document.contains("social"));
    }

    #[test]
    fn test_summaries_attached() {
        let mut summaries = HashMap::new();
        summaries.insert("A".to_string(), "Works on robots.".to_string());

        let snapshot = CorpusBuilder::new()
            .with_summaries(summaries)
            .build(vec![
                ("A".to_string(), vec![work("robots", None)]),
                ("B".to_string(), vec![work("statistics", None)]),
            ]);

        assert_eq!(snapshot.profile(0).summary.as_deref(), Some("Works on robots."));
        assert_eq!(snapshot.profile(1).summary, None);
    }

    #[test]
    fn test_parse_raw_export_preserves_key_order() -> Result<()> {
        let json = r#"{
            "Zoe": [{"title": "Robot talk", "doi": "https://doi.org/10.1/z"}],
            "Adam": [{"title": "Media effects", "abstract": "How media shapes attitudes"}]
        }"#;
        let records = parse_raw_export(json)?;
        assert_eq!(records[0].0, "Zoe");
        assert_eq!(records[1].0, "Adam");
        assert_eq!(records[1].1[0].plain_abstract(), "How media shapes attitudes");
        Ok(())
    }

    #[test]
    fn test_parse_raw_export_with_inverted_index() -> Result<()> {
        let json = r#"{
            "A": [{
                "title": "Paper",
                "abstract_inverted_index": {"alpha": [0], "beta": [2], "gamma": [1]}
            }]
        }"#;
        let records = parse_raw_export(json)?;
        assert_eq!(records[0].1[0].plain_abstract(), "alpha gamma beta");
        Ok(())
    }

    #[test]
    fn test_parse_raw_export_rejects_non_object() {
        assert!(parse_raw_export("[1, 2, 3]").is_err());
    }
}
