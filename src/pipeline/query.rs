// Query pipeline: stored references → source graph report.
//
// Each query re-filters the stored reference set, so a higher similarity
// threshold than the one used at build time narrows the graph, while a lower
// one cannot resurrect references that were never stored.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::corpus::SourceCatalogue;
use crate::db::models::BUILD_SIM_THRESHOLD;
use crate::db::Database;
use crate::graph::{build_report, HitsConfig, NodeMetric, PageRankConfig, SourceGraphReport};
use crate::references::{aggregate_sources, ArticleReference, EdgeFilter};

/// Validated parameters for one graph query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphQuery {
    pub filter: EdgeFilter,
    /// Advisory: which metric drives node size in the renderer
    pub node_size: NodeMetric,
    /// Advisory: which metric drives node color in the renderer
    pub node_color: NodeMetric,
}

impl GraphQuery {
    /// Build a query, rejecting out-of-range parameters.
    pub fn new(similarity_threshold: f64, min_edge_count: u64) -> Result<Self> {
        anyhow::ensure!(
            similarity_threshold.is_finite() && (0.0..=1.0).contains(&similarity_threshold),
            "similarity threshold must be within [0, 1], got {similarity_threshold}"
        );
        anyhow::ensure!(
            min_edge_count >= 1,
            "minimum edge count must be at least 1, got {min_edge_count}"
        );
        Ok(Self {
            filter: EdgeFilter {
                similarity_threshold,
                min_edge_count,
            },
            node_size: NodeMetric::Pagerank,
            node_color: NodeMetric::ReferencedByCount,
        })
    }

    pub fn with_metrics(mut self, node_size: NodeMetric, node_color: NodeMetric) -> Self {
        self.node_size = node_size;
        self.node_color = node_color;
        self
    }
}

impl Default for GraphQuery {
    fn default() -> Self {
        Self {
            filter: EdgeFilter::default(),
            node_size: NodeMetric::Pagerank,
            node_color: NodeMetric::ReferencedByCount,
        }
    }
}

/// Aggregate and score one query against a catalogue snapshot.
pub fn run_query(
    references: &[ArticleReference],
    catalogue: &SourceCatalogue,
    query: &GraphQuery,
) -> Result<SourceGraphReport> {
    let aggregation = aggregate_sources(references, catalogue, &query.filter)?;
    debug!(
        edges = aggregation.edges.len(),
        similarity_threshold = query.filter.similarity_threshold,
        min_edge_count = query.filter.min_edge_count,
        "Aggregated source edges"
    );

    build_report(
        catalogue,
        &aggregation,
        &PageRankConfig::default(),
        HitsConfig::default(),
    )
}

/// The stored build threshold, when the query asks for a lower one than the
/// reference set can supply. An unparseable stored value is ignored.
fn build_threshold_above(query: &GraphQuery, stored: Option<&str>) -> Option<f64> {
    let build_threshold: f64 = stored?.trim().parse().ok()?;
    (query.filter.similarity_threshold < build_threshold).then_some(build_threshold)
}

/// Run a query against the store.
pub async fn run(db: &Arc<dyn Database>, query: &GraphQuery) -> Result<SourceGraphReport> {
    let stored = db.get_build_state(BUILD_SIM_THRESHOLD).await?;
    if let Some(build_threshold) = build_threshold_above(query, stored.as_deref()) {
        warn!(
            similarity_threshold = query.filter.similarity_threshold,
            build_threshold,
            "Query threshold is below the build threshold; only references above the build threshold are stored"
        );
    }

    let catalogue = db.get_source_catalogue().await?;
    let references = db.get_references().await?;

    let report = run_query(&references, &catalogue, query)?;
    info!(
        nodes = report.nodes.len(),
        relations = report.relations.len(),
        "Graph query complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation() {
        assert!(GraphQuery::new(0.0, 1).is_ok());
        assert!(GraphQuery::new(1.0, 5).is_ok());
        assert!(GraphQuery::new(1.5, 1).is_err());
        assert!(GraphQuery::new(-0.1, 1).is_err());
        assert!(GraphQuery::new(f64::NAN, 1).is_err());
        assert!(GraphQuery::new(0.5, 0).is_err());
    }

    #[test]
    fn test_default_metrics() {
        let q = GraphQuery::new(0.5, 1).unwrap();
        assert_eq!(q.node_size, NodeMetric::Pagerank);
        assert_eq!(q.node_color, NodeMetric::ReferencedByCount);
        assert_eq!(q, GraphQuery::default());

        let q = q.with_metrics(NodeMetric::HitsAuth, NodeMetric::ReferenceDiff);
        assert_eq!(q.node_size, NodeMetric::HitsAuth);
    }

    #[test]
    fn test_build_threshold_above_query() {
        let low = GraphQuery::new(0.3, 1).unwrap();
        assert_eq!(build_threshold_above(&low, Some("0.5")), Some(0.5));
        assert_eq!(build_threshold_above(&low, Some("0.3")), None);
        assert_eq!(build_threshold_above(&low, Some("0.2")), None);
        assert_eq!(build_threshold_above(&low, None), None);
        assert_eq!(build_threshold_above(&low, Some("?")), None);
    }

    #[tokio::test]
    async fn test_low_query_threshold_only_sees_stored_references() {
        use crate::corpus::Article;
        use crate::db::SqliteDatabase;

        let article = |id: i64, source: &str| Article {
            id,
            source: source.to_string(),
            title: String::new(),
            author: String::new(),
            publish_date: None,
            location: String::new(),
            content: String::new(),
        };
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        crate::db::schema::create_tables(&conn).unwrap();
        let db: Arc<dyn Database> = Arc::new(SqliteDatabase::new(conn));
        db.replace_catalogue(&[article(1, "X"), article(2, "Y")]).await.unwrap();
        let stored = ArticleReference {
            from_id: 2,
            to_id: 1,
            similarity: 0.8,
        };
        db.replace_references(&[stored], 0.7).await.unwrap();

        let query = GraphQuery::new(0.1, 1).unwrap();
        let stored_threshold = db.get_build_state(BUILD_SIM_THRESHOLD).await.unwrap();
        assert_eq!(build_threshold_above(&query, stored_threshold.as_deref()), Some(0.7));

        let report = run(&db, &query).await.unwrap();
        assert_eq!(report.relations.len(), 1);
        assert_eq!(report.relations[0].count, 1);
    }

    #[test]
    fn test_empty_query_result() {
        let report =
            run_query(&[], &SourceCatalogue::default(), &GraphQuery::default()).unwrap();
        assert!(report.nodes.is_empty());
        assert!(report.relations.is_empty());
    }
}
