use rsrec::{
    CorpusBuilder, PublicationRecord, RankingStrategy, RecommendEngine, RecommendOptions,
};
use std::collections::HashMap;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    println!("=== RSREC Basic Usage Example ===\n");

    // Build a small corpus in memory
    println!("Building corpus...");

    let mut inverted = HashMap::new();
    for (word, positions) in [
        ("Misinformation", vec![0]),
        ("spreads", vec![1]),
        ("faster", vec![2]),
        ("on", vec![3]),
        ("social", vec![4]),
        ("media", vec![5]),
    ] {
        inverted.insert(word.to_string(), positions);
    }

    let records = vec![
        (
            "Dr. Ada Robotnik".to_string(),
            vec![
                PublicationRecord::new("Social robots in human machine communication".to_string())
                    .with_doi("https://doi.org/10.1234/robots-1".to_string()),
                PublicationRecord::new("Trust in conversational agents".to_string())
                    .with_doi("https://doi.org/10.1234/robots-2".to_string())
                    .with_abstract(
                        "How users build trust with chatbots and voice assistants.".to_string(),
                    ),
            ],
        ),
        (
            "Dr. Ben Survey".to_string(),
            vec![PublicationRecord::new(
                "Quantitative survey methods for panel studies".to_string(),
            )
            .with_doi("https://doi.org/10.1234/survey-1".to_string())],
        ),
        (
            "Dr. Cleo Media".to_string(),
            // Abstract delivered as an inverted index, as bibliographic APIs do
            vec![PublicationRecord::new("Political communication online".to_string())
                .with_doi("https://doi.org/10.1234/media-1".to_string())
                .with_inverted_abstract(inverted)],
        ),
    ];

    let snapshot = Arc::new(CorpusBuilder::new().build(records));
    println!("✓ Built snapshot for {} researchers\n", snapshot.len());

    let engine = RecommendEngine::new(snapshot);

    // Example 1: rank researchers for a research interest
    println!("--- Example 1: 'I want to study social robots and chatbots' ---");
    let results = engine.recommend(
        "I want to study social robots and chatbots",
        &RecommendOptions::default(),
    )?;

    for (i, result) in results.iter().enumerate() {
        println!("\n{}. [Score: {:.3}] {}", i + 1, result.score, result.researcher);
        println!("   Keywords: {}", result.top_keywords.join(", "));
        for paper in &result.top_papers {
            println!("   Paper: {} ({:.3})", paper.doi, paper.score);
        }
    }

    // Example 2: mean per-paper ranking strategy
    println!("\n\n--- Example 2: Mean per-paper similarity ---");
    let options = RecommendOptions {
        strategy: RankingStrategy::MeanPaperSimilarity,
        ..Default::default()
    };
    let results = engine.recommend("online misinformation and social media", &options)?;
    for (i, result) in results.iter().enumerate() {
        println!("{}. [Score: {:.3}] {}", i + 1, result.score, result.researcher);
    }

    // Example 3: an empty query is legal and scores zero everywhere
    println!("\n\n--- Example 3: Empty query ---");
    let results = engine.recommend("", &RecommendOptions::default())?;
    println!(
        "Returned {} researchers, all with score {:.1}",
        results.len(),
        results[0].score
    );

    println!("\n=== Example Complete ===");

    Ok(())
}
