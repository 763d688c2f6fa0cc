// Composition tests: verifying that the pipeline stages chain together.
//
// These tests exercise the data flow between modules:
//   Articles -> TF-IDF -> Similarity -> References -> Source edges -> Report
// without touching the filesystem, except the store round trip at the end
// which uses an in-memory SQLite connection.

use chrono::NaiveDate;

use refgraph::corpus::{Article, SourceCatalogue};
use refgraph::graph::{build_report, HitsConfig, PageRankConfig, SourceRelation};
use refgraph::pipeline::build::infer_references_from_articles;
use refgraph::pipeline::query::run_query;
use refgraph::pipeline::GraphQuery;
use refgraph::references::{aggregate_sources, infer_references, EdgeFilter};
use refgraph::text::similarity::SimilarityMatrix;
use refgraph::text::tfidf::TfIdfVectorizer;

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2014, 1, d)
}

fn article(id: i64, source: &str, d: u32, content: &str) -> Article {
    Article {
        id,
        source: source.to_string(),
        title: String::new(),
        author: String::new(),
        publish_date: day(d),
        location: String::new(),
        content: content.to_string(),
    }
}

// ============================================================
// Three-article scenario
// ============================================================

#[test]
fn three_article_scenario_collapses_to_one_cross_source_edge() {
    // A (day 1, X), B (day 2, Y), C (day 3, Y)
    // sim(A,B) = 0.8, sim(B,C) = 0.6, sim(A,C) = 0.3
    let similarity = SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.8, 0.3],
        vec![0.8, 1.0, 0.6],
        vec![0.3, 0.6, 1.0],
    ])
    .unwrap();
    let ids = [1, 2, 3];
    let dates = [day(1), day(2), day(3)];

    let references = infer_references(&similarity, &ids, &dates, 0.5).unwrap();
    let pairs: Vec<(i64, i64)> = references.iter().map(|r| (r.from_id, r.to_id)).collect();
    assert_eq!(pairs, vec![(2, 1), (3, 2)]);

    let articles = vec![
        article(1, "X", 1, ""),
        article(2, "Y", 2, ""),
        article(3, "Y", 3, ""),
    ];
    let catalogue = SourceCatalogue::from_articles(&articles);
    let report = run_query(&references, &catalogue, &GraphQuery::default()).unwrap();

    assert_eq!(report.nodes.len(), 2);
    let x = &report.nodes[0];
    let y = &report.nodes[1];
    assert_eq!((x.name.as_str(), y.name.as_str()), ("X", "Y"));
    assert_eq!(x.referenced_by_count, 1);
    assert_eq!(y.references_to_others_count, 1);
    assert_eq!(y.reference_diff, 1);
    assert_eq!(
        report.relations,
        vec![SourceRelation { from_idx: 1, to_idx: 0, count: 1 }]
    );
}

// ============================================================
// Degenerate inputs
// ============================================================

#[test]
fn empty_corpus_yields_empty_report() {
    let references =
        infer_references_from_articles(&[], &TfIdfVectorizer::default(), 0.5).unwrap();
    assert!(references.is_empty());

    let catalogue = SourceCatalogue::from_articles(&[]);
    let report = run_query(&references, &catalogue, &GraphQuery::default()).unwrap();
    assert!(report.nodes.is_empty());
    assert!(report.relations.is_empty());
}

#[test]
fn same_day_and_undated_articles_never_reference() {
    let mut undated = article(3, "Z", 1, "the mayor opened the new bridge across the river");
    undated.publish_date = None;
    let articles = vec![
        article(1, "X", 1, "the mayor opened the new bridge across the river"),
        article(2, "Y", 1, "the mayor opened the new bridge across the river"),
        undated,
        article(4, "W", 2, "rain expected over the weekend in the hills"),
    ];
    let references =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.1).unwrap();
    assert!(references.is_empty(), "got {references:?}");
}

// ============================================================
// End-to-end on real text
// ============================================================

fn corpus() -> Vec<Article> {
    vec![
        article(1, "Wire", 1, "gas company executives vanished during the annual celebration at headquarters"),
        article(2, "Daily", 2, "gas company executives vanished during the annual celebration at headquarters police say"),
        article(3, "Post", 3, "gas company executives vanished during the annual celebration at headquarters police say officials"),
        article(4, "Daily", 3, "local football team wins the regional championship after extra time"),
        article(5, "Post", 4, "local football team wins the regional championship after extra time again"),
        article(6, "Herald", 4, "weather service warns of heavy snow across the northern valleys"),
    ]
}

#[test]
fn later_copies_point_at_earlier_originals() {
    let articles = corpus();
    let references =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.5).unwrap();

    let dates: std::collections::HashMap<i64, Option<NaiveDate>> =
        articles.iter().map(|a| (a.id, a.publish_date)).collect();
    assert!(!references.is_empty());
    for r in &references {
        assert!(r.similarity > 0.5);
        assert!(dates[&r.from_id] > dates[&r.to_id], "{r:?} runs backwards in time");
    }
    assert!(references.iter().any(|r| (r.from_id, r.to_id) == (2, 1)));
    assert!(references.iter().any(|r| (r.from_id, r.to_id) == (5, 4)));
}

#[test]
fn isolated_sources_survive_any_filter() {
    let articles = corpus();
    let catalogue = SourceCatalogue::from_articles(&articles);
    let references =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.5).unwrap();

    for (threshold, min_count) in [(0.5, 1), (0.9, 1), (1.0, 1), (0.5, 50)] {
        let query = GraphQuery::new(threshold, min_count).unwrap();
        let report = run_query(&references, &catalogue, &query).unwrap();
        let names: Vec<&str> = report.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Daily", "Herald", "Post", "Wire"]);

        let herald = &report.nodes[1];
        assert_eq!(herald.referenced_by_count, 0);
        assert_eq!(herald.references_to_others_count, 0);
        assert_eq!(herald.pagerank, 0.0);
        assert_eq!(herald.hits_hub, 0.0);
        assert_eq!(herald.hits_auth, 0.0);
    }
}

// ============================================================
// Aggregation properties
// ============================================================

#[test]
fn tighter_filters_never_add_edges() {
    let articles = corpus();
    let catalogue = SourceCatalogue::from_articles(&articles);
    let references =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.0).unwrap();

    let edge_set = |threshold: f64, min_edge_count: u64| {
        let filter = EdgeFilter { similarity_threshold: threshold, min_edge_count };
        aggregate_sources(&references, &catalogue, &filter)
            .unwrap()
            .edges
            .into_iter()
            .map(|e| (e.from, e.to))
            .collect::<std::collections::BTreeSet<_>>()
    };

    let thresholds = [0.0, 0.2, 0.5, 0.7, 0.9, 1.0];
    for pair in thresholds.windows(2) {
        assert!(edge_set(pair[1], 1).is_subset(&edge_set(pair[0], 1)));
    }
    for min_count in 1..4 {
        assert!(edge_set(0.0, min_count + 1).is_subset(&edge_set(0.0, min_count)));
    }
}

#[test]
fn higher_build_threshold_never_adds_references() {
    let articles = corpus();
    let reference_set = |threshold: f64| {
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), threshold)
            .unwrap()
            .into_iter()
            .map(|r| (r.from_id, r.to_id))
            .collect::<std::collections::BTreeSet<_>>()
    };

    let thresholds = [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0];
    let sets: Vec<_> = thresholds.iter().map(|t| reference_set(*t)).collect();
    for (pair, bounds) in sets.windows(2).zip(thresholds.windows(2)) {
        assert!(
            pair[1].is_subset(&pair[0]),
            "raising the threshold from {} to {} added references",
            bounds[0],
            bounds[1]
        );
    }
    assert!(sets[0].len() > sets[3].len());
    assert!(sets[6].is_empty());
}

#[test]
fn weighted_degrees_sum_to_edge_counts() {
    let articles = corpus();
    let catalogue = SourceCatalogue::from_articles(&articles);
    let references =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.2).unwrap();
    let report = run_query(&references, &catalogue, &GraphQuery::new(0.2, 1).unwrap()).unwrap();

    let total: u64 = report.relations.iter().map(|r| r.count).sum();
    let in_sum: u64 = report.nodes.iter().map(|n| n.referenced_by_count).sum();
    let out_sum: u64 = report.nodes.iter().map(|n| n.references_to_others_count).sum();
    assert_eq!(in_sum, total);
    assert_eq!(out_sum, total);
    for relation in &report.relations {
        assert_ne!(relation.from_idx, relation.to_idx);
    }
}

// ============================================================
// Centrality on the smallest graph
// ============================================================

#[test]
fn single_edge_centrality() {
    // A -> B
    let articles = vec![article(1, "A", 2, ""), article(2, "B", 1, "")];
    let catalogue = SourceCatalogue::from_articles(&articles);
    let references = vec![refgraph::references::ArticleReference {
        from_id: 1,
        to_id: 2,
        similarity: 0.9,
    }];
    let aggregation = aggregate_sources(&references, &catalogue, &EdgeFilter::default()).unwrap();
    let report = build_report(
        &catalogue,
        &aggregation,
        &PageRankConfig::default(),
        HitsConfig::default(),
    )
    .unwrap();

    let (a, b) = (&report.nodes[0], &report.nodes[1]);
    assert!(b.pagerank > a.pagerank);
    assert!((a.pagerank + b.pagerank - 1.0).abs() < 1e-6);
    assert!((a.hits_hub - 1.0).abs() < 1e-9);
    assert!((b.hits_auth - 1.0).abs() < 1e-9);
    assert_eq!(a.hits_auth, 0.0);
    assert_eq!(b.hits_hub, 0.0);
}

// ============================================================
// Store round trip
// ============================================================

#[tokio::test]
async fn store_round_trip_matches_in_memory_query() {
    use refgraph::db::{Database, SqliteDatabase};

    let conn = rusqlite::Connection::open_in_memory().unwrap();
    refgraph::db::schema::create_tables(&conn).unwrap();
    let db: std::sync::Arc<dyn Database> = std::sync::Arc::new(SqliteDatabase::new(conn));

    let articles = corpus();
    db.replace_catalogue(&articles).await.unwrap();
    let (compared, stored) = refgraph::pipeline::build::run(&db, 0.5).await.unwrap();
    assert_eq!(compared, articles.len());

    let expected_refs =
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.5).unwrap();
    assert_eq!(stored, expected_refs.len());

    let query = GraphQuery::default();
    let from_store = refgraph::pipeline::query::run(&db, &query).await.unwrap();
    let in_memory =
        run_query(&expected_refs, &SourceCatalogue::from_articles(&articles), &query).unwrap();
    assert_eq!(from_store, in_memory);
}
