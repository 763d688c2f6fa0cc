use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::references::DEFAULT_SIM_THRESHOLD;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// value has a default, so `refgraph init` works with no configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path (REFGRAPH_DB_PATH, default ./refgraph.db)
    pub db_path: String,
    /// Root of the news directory tree (REFGRAPH_NEWS_DIR)
    pub news_dir: PathBuf,
    /// Similarity threshold used when rebuilding references (REFGRAPH_SIM_THRESHOLD)
    pub sim_threshold: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. `load` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sim_threshold = match lookup("REFGRAPH_SIM_THRESHOLD") {
            Some(raw) => parse_threshold(&raw)?,
            None => DEFAULT_SIM_THRESHOLD,
        };

        Ok(Self {
            db_path: lookup("REFGRAPH_DB_PATH").unwrap_or_else(|| "./refgraph.db".to_string()),
            news_dir: lookup("REFGRAPH_NEWS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/News Articles")),
            sim_threshold,
        })
    }

    /// Check that the news directory exists.
    /// Call this before ingesting.
    pub fn require_news_dir(&self) -> Result<()> {
        if !self.news_dir.is_dir() {
            anyhow::bail!(
                "News directory not found at {}.\n\
                 Set REFGRAPH_NEWS_DIR in your .env file or pass a directory to `refgraph ingest`.",
                self.news_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("REFGRAPH_SIM_THRESHOLD is not a number: {raw:?}"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        anyhow::bail!("REFGRAPH_SIM_THRESHOLD must be within [0, 1], got {value}");
    }
    Ok(value)
}
