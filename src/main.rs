use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use refgraph::config::Config;
use refgraph::graph::NodeMetric;
use refgraph::pipeline::GraphQuery;

/// refgraph: who copies whom in a news corpus.
///
/// Infers article-to-article references from textual similarity and
/// publication order, then ranks outlets by how they reference each other.
#[derive(Parser)]
#[command(name = "refgraph", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Load (or reload) the article catalogue from the news directory
    Ingest {
        /// News directory (defaults to REFGRAPH_NEWS_DIR)
        dir: Option<PathBuf>,
    },

    /// Rebuild the stored article references
    Build {
        /// Similarity threshold (defaults to REFGRAPH_SIM_THRESHOLD)
        #[arg(long)]
        similarity_threshold: Option<f64>,
    },

    /// Query the source reference graph
    Graph {
        /// Minimum similarity for a reference to count
        #[arg(long, default_value = "0.5")]
        similarity_threshold: f64,

        /// Minimum references for a source-to-source edge
        #[arg(long, default_value = "1")]
        min_edge_count: u64,

        /// Metric used to order (size) nodes
        #[arg(long, default_value = "pagerank")]
        node_size: NodeMetric,

        /// Metric used to color nodes
        #[arg(long, default_value = "referenced_by_count")]
        node_color: NodeMetric,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show system status (DB stats, last ingest and build)
    Status,

    /// Pivot precomputed entity sentiment by source or entity
    Sentiment {
        /// CSV table or JSON array of {source, entities, entity_sentiment, content} records
        file: PathBuf,

        /// Mean sentiment per entity for this source
        #[arg(long, conflicts_with = "entity")]
        source: Option<String>,

        /// Mean sentiment per source for this entity
        #[arg(long)]
        entity: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a graph-description file into nodes and links
    GraphFile {
        /// The graph file to parse
        file: PathBuf,

        /// Keep only links touching this organization
        #[arg(long)]
        organization: Option<String>,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("refgraph=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing refgraph database...");
            let config = Config::load()?;
            let db = refgraph::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: run `refgraph ingest` to load the news directory");
            println!("  (reads {})", config.news_dir.display());
        }

        Commands::Ingest { dir } => {
            let mut config = Config::load()?;
            if let Some(dir) = dir {
                config.news_dir = dir;
            }
            config.require_news_dir()?;
            let db = refgraph::db::initialize_sqlite(&config.db_path)?;

            println!("Ingesting articles from {}...", config.news_dir.display());
            let (articles, sources) =
                refgraph::pipeline::ingest::run(&db, &config.news_dir).await?;

            println!("\n{}", "Ingest complete.".bold());
            println!("  Articles: {articles}");
            println!("  Sources: {sources}");
            println!("\nStored references were cleared. Run `refgraph build` next.");
        }

        Commands::Build {
            similarity_threshold,
        } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let threshold = similarity_threshold.unwrap_or(config.sim_threshold);

            println!("Rebuilding article references (similarity > {threshold})...");
            let (articles, references) = refgraph::pipeline::build::run(&db, threshold).await?;

            println!("\n{}", "Build complete.".bold());
            println!("  Articles compared: {articles}");
            println!("  References stored: {references}");
        }

        Commands::Graph {
            similarity_threshold,
            min_edge_count,
            node_size,
            node_color,
            json,
            output,
        } => {
            let query = GraphQuery::new(similarity_threshold, min_edge_count)?
                .with_metrics(node_size, node_color);
            let config = Config::load()?;
            let db = open_database(&config)?;

            let report = refgraph::pipeline::query::run(&db, &query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                refgraph::output::terminal::display_graph_report(&report, &query);
            }
            if let Some(path) = output {
                refgraph::output::write_json(&report, &path)?;
                if !json {
                    println!("\nReport written to: {}", path.display());
                }
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            if !refgraph::status::database_exists(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `refgraph init` to set up the database.");
                return Ok(());
            }
            let db = open_database(&config)?;
            refgraph::status::show(&db, &config.db_path).await?;
        }

        Commands::Sentiment {
            file,
            source,
            entity,
            json,
        } => {
            let table = refgraph::sentiment::SentimentTable::load(&file)?;

            match (source, entity) {
                (Some(source), _) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&table.source_heatmap(&source))?);
                    } else {
                        refgraph::output::terminal::display_pivot(
                            &format!("Sentiment by entity for {source}"),
                            &table.by_source(&source),
                        );
                    }
                }
                (None, Some(entity)) => {
                    let points = table.by_entity(&entity);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&points)?);
                    } else {
                        refgraph::output::terminal::display_pivot(
                            &format!("Sentiment by source for {entity}"),
                            &points,
                        );
                    }
                }
                (None, None) => {
                    if json {
                        let keys = serde_json::json!({
                            "sources": table.sources(),
                            "entities": table.entities(),
                        });
                        println!("{}", serde_json::to_string_pretty(&keys)?);
                    } else {
                        refgraph::output::terminal::display_sentiment_keys(&table);
                    }
                }
            }
        }

        Commands::GraphFile {
            file,
            organization,
            json,
        } => {
            let mut graph = refgraph::graphfile::GraphFile::load(&file)?;
            if let Some(org) = organization {
                graph = graph.focus(&org);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                refgraph::output::terminal::display_graph_file(&graph);
            }
        }
    }

    Ok(())
}

/// Open the existing database behind the Database trait.
fn open_database(config: &Config) -> Result<Arc<dyn refgraph::db::Database>> {
    refgraph::db::open_sqlite(&config.db_path)
}
