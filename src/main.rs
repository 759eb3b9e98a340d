use anyhow::Result;
use clap::{Parser, Subcommand};
use rsrec::api::create_router;
use rsrec::corpus::{load_raw_export, load_summaries, CorpusBuilder};
use rsrec::engine::{RankingStrategy, RecommendEngine, RecommendOptions};
use rsrec::normalizer::Normalizer;
use rsrec::snapshot::Snapshot;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Research supervisor recommender in Rust", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a snapshot from a bibliographic JSON export
    Build {
        /// Export file (.json or .json.gz), a JSON object keyed by researcher name
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the snapshot
        #[arg(short, long, default_value = "snapshot.bin.gz")]
        output: PathBuf,

        /// Optional sidecar with curated summaries (name -> text)
        #[arg(long)]
        summaries: Option<PathBuf>,

        /// Skip stemming (exact surface-form matching)
        #[arg(long)]
        no_stemming: bool,
    },

    /// Query a snapshot once and print the shortlist
    Recommend {
        #[arg(short, long, default_value = "snapshot.bin.gz")]
        snapshot: PathBuf,

        /// Free-text research interests
        #[arg(short, long)]
        query: String,

        #[arg(long, default_value_t = 3)]
        top_researchers: usize,

        #[arg(long, default_value_t = 3)]
        top_papers: usize,

        /// Rank researchers by mean per-paper similarity instead of
        /// aggregate document similarity
        #[arg(long)]
        mean_paper: bool,
    },

    /// Serve the recommender over HTTP
    Serve {
        #[arg(short, long, default_value = "snapshot.bin.gz")]
        snapshot: PathBuf,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    match args.command {
        Command::Build {
            input,
            output,
            summaries,
            no_stemming,
        } => build(input, output, summaries, no_stemming),
        Command::Recommend {
            snapshot,
            query,
            top_researchers,
            top_papers,
            mean_paper,
        } => recommend(snapshot, &query, top_researchers, top_papers, mean_paper),
        Command::Serve {
            snapshot,
            host,
            port,
        } => serve(snapshot, &host, port).await,
    }
}

fn build(
    input: PathBuf,
    output: PathBuf,
    summaries: Option<PathBuf>,
    no_stemming: bool,
) -> Result<()> {
    let start = Instant::now();
    let records = load_raw_export(&input)?;
    tracing::info!(
        researchers = records.len(),
        input = %input.display(),
        "export loaded"
    );

    let mut builder = CorpusBuilder::new();
    if no_stemming {
        builder = builder.with_normalizer(Normalizer::without_stemming());
    }
    if let Some(path) = summaries {
        builder = builder.with_summaries(load_summaries(path)?);
    }

    let snapshot = builder.build(records);
    snapshot.save(&output)?;

    let stats = snapshot.stats();
    tracing::info!(
        researchers = stats.researchers,
        works = stats.works,
        vocabulary_terms = stats.vocabulary_terms,
        output = %output.display(),
        elapsed = ?start.elapsed(),
        "snapshot written"
    );
    Ok(())
}

fn recommend(
    snapshot_path: PathBuf,
    query: &str,
    top_researchers: usize,
    top_papers: usize,
    mean_paper: bool,
) -> Result<()> {
    let snapshot = Arc::new(Snapshot::load(&snapshot_path)?);
    let engine = RecommendEngine::new(snapshot);

    let options = RecommendOptions {
        top_researchers,
        top_papers,
        strategy: if mean_paper {
            RankingStrategy::MeanPaperSimilarity
        } else {
            RankingStrategy::DocumentSimilarity
        },
    };

    let start = Instant::now();
    let results = engine.recommend(query, &options)?;
    println!(
        "Found {} researcher(s) in {:?} for: \"{}\"\n",
        results.len(),
        start.elapsed(),
        query
    );

    for (rank, result) in results.iter().enumerate() {
        println!("{}. [{:.3}] {}", rank + 1, result.score, result.researcher);
        if let Some(summary) = &result.summary {
            println!("   {}", summary);
        }
        if !result.top_keywords.is_empty() {
            println!("   keywords: {}", result.top_keywords.join(", "));
        }
        for paper in &result.top_papers {
            println!("   - {} ({:.3})", paper.doi, paper.score);
        }
        println!();
    }
    Ok(())
}

async fn serve(snapshot_path: PathBuf, host: &str, port: u16) -> Result<()> {
    let snapshot = Arc::new(Snapshot::load(&snapshot_path)?);
    let engine = Arc::new(RecommendEngine::new(snapshot));
    let app = create_router(engine);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
