// Colored terminal output for graph reports, sentiment pivots and graph files.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here.

use colored::{ColoredString, Colorize};

use crate::graph::{NodeMetric, SourceGraphReport, SourceNode};
use crate::graphfile::GraphFile;
use crate::pipeline::GraphQuery;
use crate::sentiment::{PivotPoint, SentimentTable};

/// Relative position of a value within the observed range of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    High,
    Mid,
    Low,
}

/// Split `[min, max]` into thirds. A flat range is all Low.
pub fn band(value: f64, min: f64, max: f64) -> Band {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        return Band::Low;
    }
    let t = (value - min) / span;
    if t >= 2.0 / 3.0 {
        Band::High
    } else if t >= 1.0 / 3.0 {
        Band::Mid
    } else {
        Band::Low
    }
}

fn colorize_band(text: String, band: Band) -> ColoredString {
    match band {
        Band::High => text.red().bold(),
        Band::Mid => text.yellow(),
        Band::Low => text.normal(),
    }
}

/// Nodes ordered by a metric, largest first. Ties keep catalogue order.
pub fn rank_nodes(report: &SourceGraphReport, metric: NodeMetric) -> Vec<&SourceNode> {
    let mut nodes: Vec<&SourceNode> = report.nodes.iter().collect();
    nodes.sort_by(|a, b| b.metric(metric).total_cmp(&a.metric(metric)));
    nodes
}

/// Display a source graph report: one row per source, sorted by the size
/// metric and colored by the color metric, followed by the strongest edges.
pub fn display_graph_report(report: &SourceGraphReport, query: &GraphQuery) {
    if report.nodes.is_empty() {
        println!("No sources in the catalogue. Run `refgraph ingest` first.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Source Graph ({} sources, {} edges) ===",
            report.nodes.len(),
            report.relations.len()
        )
        .bold()
    );
    println!(
        "  similarity >= {:.2}, edge count >= {}, sized by {}, colored by {}",
        query.filter.similarity_threshold,
        query.filter.min_edge_count,
        query.node_size,
        query.node_color
    );
    println!();

    println!(
        "  {:>4}  {:<32} {:>6} {:>6} {:>6}  {:>8}  {:>8}  {:>8}",
        "Rank".dimmed(),
        "Source".dimmed(),
        "In".dimmed(),
        "Out".dimmed(),
        "Diff".dimmed(),
        "PageRank".dimmed(),
        "Hub".dimmed(),
        "Auth".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    let (min, max) = report
        .nodes
        .iter()
        .map(|n| n.metric(query.node_color))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    for (i, node) in rank_nodes(report, query.node_size).into_iter().enumerate() {
        let name = format!("{:<32}", super::truncate_chars(&node.name, 29));
        let colored_name = colorize_band(name, band(node.metric(query.node_color), min, max));
        println!(
            "  {:>4}. {} {:>6} {:>6} {:>+6}  {:>8.4}  {:>8.4}  {:>8.4}",
            i + 1,
            colored_name,
            node.referenced_by_count,
            node.references_to_others_count,
            node.reference_diff,
            node.pagerank,
            node.hits_hub,
            node.hits_auth,
        );
    }

    if report.relations.is_empty() {
        println!("\n  No cross-source references at this threshold.");
        return;
    }

    let mut relations = report.relations.clone();
    relations.sort_by(|a, b| b.count.cmp(&a.count));
    println!("\n  Strongest references:");
    for relation in relations.iter().take(10) {
        println!(
            "    {} {} {}  ({})",
            report.nodes[relation.from_idx].name,
            "->".dimmed(),
            report.nodes[relation.to_idx].name,
            relation.count
        );
    }
    if relations.len() > 10 {
        println!("    {}", format!("... and {} more", relations.len() - 10).dimmed());
    }
}

/// Display a sentiment pivot as a bar list.
pub fn display_pivot(title: &str, points: &[PivotPoint]) {
    println!("\n{}", format!("=== {title} ===").bold());
    if points.is_empty() {
        println!("  No matching records.");
        return;
    }

    for point in points {
        let (score, bar) = match point.y {
            Some(y) => (format!("{y:>+6.2}"), sentiment_bar(y)),
            None => ("   n/a".to_string(), String::new().normal()),
        };
        println!("  {:<28} {} {}", super::truncate_chars(&point.x, 25), score, bar);
        if let Some(content) = &point.content {
            println!("  {:<28} {}", "", super::truncate_chars(content, 80).dimmed());
        }
    }
}

fn sentiment_bar(y: f64) -> ColoredString {
    let width = (y.abs().min(1.0) * 20.0).round() as usize;
    let bar = "#".repeat(width);
    if y < 0.0 {
        bar.red()
    } else {
        bar.green()
    }
}

/// Display the distinct entities and sources of a sentiment table.
pub fn display_sentiment_keys(table: &SentimentTable) {
    let sources = table.sources();
    let entities = table.entities();
    println!(
        "\n{}",
        format!("=== Sentiment records ({}) ===", table.len()).bold()
    );
    println!("  Sources ({}): {}", sources.len(), sources.join(", "));
    println!("  Entities ({}): {}", entities.len(), entities.join(", "));
}

/// Display a parsed graph file as node and link lists.
pub fn display_graph_file(graph: &GraphFile) {
    println!(
        "\n{}",
        format!(
            "=== Graph file ({} nodes, {} links) ===",
            graph.nodes.len(),
            graph.links.len()
        )
        .bold()
    );
    for node in &graph.nodes {
        println!("  {:<32} {}", node.id, node.label.dimmed());
    }
    if !graph.links.is_empty() {
        println!();
        for link in &graph.links {
            println!(
                "  {} {} {}  ({})",
                link.source,
                "->".dimmed(),
                link.target,
                link.weight
            );
        }
    }
}
