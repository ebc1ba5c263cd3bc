//! CLI interface for the vector store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragvec_db::{DistanceMetric, Filter, Metadata, SnapshotManager, Vector, VectorStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ragvec")]
#[command(about = "An in-memory vector store with metadata filtering", long_about = None)]
struct Cli {
    /// Snapshot directory the store is loaded from and saved to
    #[arg(long, default_value = "ragvec-data")]
    data_dir: String,

    /// Active metric for a newly created store
    #[arg(long, default_value = "cosine")]
    metric: DistanceMetric,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert (or replace) a record
    Insert {
        /// Record key, typically the chunk text
        key: String,
        /// Vector data as comma-separated values (e.g., "1.0,2.0,3.0")
        #[arg(short, long)]
        vector: String,
        /// Metadata as a JSON object
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Search for similar records
    Search {
        /// Query vector as comma-separated values (e.g., "1.0,2.0,3.0")
        query: String,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Metric to rank by instead of the store's active one
        #[arg(long)]
        metric: Option<DistanceMetric>,
        /// Metadata filter as a JSON object, e.g. '{"page": {"gte": 10}}'
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Merge fields into a record's metadata
    UpdateMetadata {
        key: String,
        /// Fields to merge, as a JSON object
        metadata: String,
    },
    /// Delete a record
    Delete { key: String },
    /// List all record keys
    List,
    /// Print store statistics as JSON
    Stats,
    /// Change the store's active metric
    SetMetric { metric: DistanceMetric },
    /// List the available metrics
    Metrics,
}

fn parse_metadata(json: &str) -> Result<Metadata> {
    serde_json::from_str(json).with_context(|| format!("invalid metadata JSON: {json}"))
}

fn run(store: &mut VectorStore, command: Commands) -> Result<bool> {
    match command {
        Commands::Insert {
            key,
            vector,
            metadata,
        } => {
            let v = Vector::from_str(&vector)?;
            let metadata = metadata.as_deref().map(parse_metadata).transpose()?;
            store.insert_with_metadata(key.clone(), v, metadata.unwrap_or_default())?;
            println!("Inserted record: {}", key);
            Ok(true)
        }
        Commands::Search {
            query,
            k,
            metric,
            filter,
        } => {
            let q = Vector::from_str(&query)?;
            let filter = filter.as_deref().map(Filter::from_json).transpose()?;
            let metric_used = metric.unwrap_or(store.metric());
            let results = store.search(&q, k, metric, filter.as_ref())?;

            if results.is_empty() {
                println!("No results found");
            } else {
                println!("Top {} results ({}):", results.len(), metric_used);
                for (i, result) in results.iter().enumerate() {
                    let source = result
                        .metadata
                        .get("source")
                        .map(|s| format!(" [{}]", s))
                        .unwrap_or_default();
                    if metric_used.is_negated_distance() {
                        println!("{}. {}{} (distance: {:.4})", i + 1, result.key, source, -result.score);
                    } else {
                        println!("{}. {}{} (score: {:.4})", i + 1, result.key, source, result.score);
                    }
                }
            }
            Ok(false)
        }
        Commands::UpdateMetadata { key, metadata } => {
            store.update_metadata(&key, parse_metadata(&metadata)?)?;
            println!("Updated metadata for: {}", key);
            Ok(true)
        }
        Commands::Delete { key } => {
            store.delete(&key)?;
            println!("Deleted record: {}", key);
            Ok(true)
        }
        Commands::List => {
            if store.is_empty() {
                println!("No records in store");
            } else {
                println!("Record keys ({} total):", store.len());
                for key in store.keys() {
                    println!("  - {}", key);
                }
            }
            Ok(false)
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.get_statistics())?);
            Ok(false)
        }
        Commands::SetMetric { metric } => {
            store.set_metric(metric);
            println!("Active metric: {}", metric);
            Ok(true)
        }
        Commands::Metrics => {
            for name in DistanceMetric::available_names() {
                let marker = if name == store.metric().name() { "*" } else { " " };
                println!("{} {}", marker, name);
            }
            Ok(false)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let snapshots = SnapshotManager::new(&cli.data_dir)?;
    let mut store = snapshots
        .load(None)?
        .unwrap_or_else(|| VectorStore::new(cli.metric));

    if run(&mut store, cli.command)? {
        snapshots.save(&store)?;
    }
    Ok(())
}
