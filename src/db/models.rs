// Store-level models that don't belong to the corpus or reference types.

use serde::{Deserialize, Serialize};

/// Build-state key: when the catalogue was last re-ingested.
pub const LAST_INGEST_AT: &str = "last_ingest_at";
/// Build-state key: the news directory the catalogue was ingested from.
pub const LAST_INGEST_DIR: &str = "last_ingest_dir";
/// Build-state key: when the reference set was last rebuilt.
pub const LAST_BUILD_AT: &str = "last_build_at";
/// Build-state key: similarity threshold used for the stored reference set.
pub const BUILD_SIM_THRESHOLD: &str = "sim_threshold";

/// Row counts across the catalogue and reference tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub articles: i64,
    pub sources: i64,
    pub references: i64,
}
