use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Noun phrases longer than this are almost never a single concept.
const MAX_PHRASE_TOKENS: usize = 4;

lazy_static::lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let mut words: HashSet<&'static str> = [
            "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
            "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being",
            "below", "between", "both", "but", "by", "can", "can't", "cannot", "could",
            "couldn't", "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down",
            "during", "each", "few", "for", "from", "further", "had", "hadn't", "has",
            "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her",
            "here", "here's", "hers", "herself", "him", "himself", "his", "how", "how's",
            "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it",
            "it's", "its", "itself", "let's", "me", "more", "most", "mustn't", "my",
            "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other",
            "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shan't",
            "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some", "such",
            "than", "that", "that's", "the", "their", "theirs", "them", "themselves",
            "then", "there", "there's", "these", "they", "they'd", "they'll", "they're",
            "they've", "this", "those", "through", "to", "too", "under", "until", "up",
            "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
            "weren't", "what", "what's", "when", "when's", "where", "where's", "which",
            "while", "who", "who's", "whom", "why", "why's", "with", "won't", "would",
            "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
            "yourself", "yourselves",
        ]
        .iter()
        .copied()
        .collect();

        // Academic boilerplate that carries no topical signal, and short
        // fragments left behind by non-English titles in the corpus.
        words.extend([
            "study", "studies", "result", "results", "analysis", "research",
            "find", "found", "change",
            "de", "der", "die", "und", "van", "het", "een", "la", "le", "les",
            "des", "du", "el", "en",
        ]);

        words
    };
}

/// Turns raw free text into normalized matching units: lowercased,
/// stopword-filtered, stemmed unigrams, followed by multi-word phrases.
pub struct Normalizer {
    stemmer: Option<Stemmer>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Some(Stemmer::create(Algorithm::English)),
        }
    }

    /// Degraded mode: tokens pass through unstemmed, so matching falls back
    /// to exact surface-form overlap. Every ranking contract holds either way.
    pub fn without_stemming() -> Self {
        Self { stemmer: None }
    }

    fn reduce(&self, token: &str) -> String {
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(token).to_string(),
            None => token.to_string(),
        }
    }

    /// A token survives if it is purely alphabetic and not a stopword.
    fn keeps(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(char::is_alphabetic) && !STOPWORDS.contains(token)
    }

    /// Normalized matching units, with repeats: surviving unigrams first,
    /// then phrases built from runs of adjacent surviving tokens, both in
    /// first-seen order.
    pub fn units(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();

        let mut unigrams = Vec::new();
        let mut phrases = Vec::new();
        let mut run: Vec<String> = Vec::new();

        for word in lowered.unicode_words() {
            if self.keeps(word) {
                let reduced = self.reduce(word);
                unigrams.push(reduced.clone());
                run.push(reduced);
            } else if !run.is_empty() {
                Self::flush_run(&mut run, &mut phrases);
            }
        }
        Self::flush_run(&mut run, &mut phrases);

        unigrams.extend(phrases);
        unigrams
    }

    fn flush_run(run: &mut Vec<String>, phrases: &mut Vec<String>) {
        if run.len() >= 2 && run.len() <= MAX_PHRASE_TOKENS {
            phrases.push(run.join(" "));
        }
        run.clear();
    }

    /// Full normalization: units joined into one space-separated string.
    /// Input with no alphabetic content yields an empty string, which
    /// vectorizes to a legal all-zero vector.
    pub fn normalize(&self, text: &str) -> String {
        self.units(text).join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
