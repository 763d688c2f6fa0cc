// Graph-description files: a small Cypher-like text format listing entity
// nodes and weighted relationships between them.
//
//   CREATE (:ORG {name: "GAStech"})
//   MATCH (a {name: "GAStech"}), (b {name: "POK"})
//   CREATE (a)-[:RELATED {weight: 3}]->(b)
//
// Only the subset above is understood. Anything else is ignored line by line,
// so a file with stray statements still yields whatever nodes and links it
// declares.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

static NODE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\(:([A-Z]+) \{name:\s*"([^"]+)"\}\)"#).expect("node pattern is valid")
});

static NAME_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{name:\s*"([^"]+)"\}"#).expect("name pattern is valid")
});

static WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"weight:\s*(\d+)").expect("weight pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFileNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFileLink {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

/// Nodes and links declared by one file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<GraphFileNode>,
    pub links: Vec<GraphFileLink>,
}

impl GraphFile {
    /// Read and parse a graph file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph file {}", path.display()))?;
        let graph = parse_graph_file(&text);
        info!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            path = %path.display(),
            "Parsed graph file"
        );
        Ok(graph)
    }

    /// Keep only the neighbourhood of one organization: links that touch
    /// it, the nodes on those links, and the organization itself.
    pub fn focus(&self, organization: &str) -> GraphFile {
        let mut keep: BTreeSet<&str> = BTreeSet::new();
        keep.insert(organization);

        let links: Vec<GraphFileLink> = self
            .links
            .iter()
            .filter(|l| l.source == organization || l.target == organization)
            .cloned()
            .collect();
        for link in &links {
            keep.insert(&link.source);
            keep.insert(&link.target);
        }

        let nodes = self
            .nodes
            .iter()
            .filter(|n| keep.contains(n.id.as_str()))
            .cloned()
            .collect();

        GraphFile { nodes, links }
    }
}

/// Parse graph-file text.
///
/// A node declared twice keeps its first position and its last label. A
/// `MATCH` naming exactly two nodes arms the next `CREATE` as a link between
/// them; a `MATCH` naming any other number clears it.
pub fn parse_graph_file(text: &str) -> GraphFile {
    let mut nodes: Vec<GraphFileNode> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut links = Vec::new();
    let mut pending: Option<(String, String)> = None;

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with("CREATE (") && line.contains("name:") {
            let Some(caps) = NODE_DECL.captures(line) else {
                continue;
            };
            let (Some(label), Some(name)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            match positions.get(name.as_str()) {
                Some(&pos) => nodes[pos].label = label.as_str().to_string(),
                None => {
                    positions.insert(name.as_str().to_string(), nodes.len());
                    nodes.push(GraphFileNode {
                        id: name.as_str().to_string(),
                        label: label.as_str().to_string(),
                    });
                }
            }
        } else if line.starts_with("MATCH") && line.contains("{name:") {
            let names: Vec<&str> = NAME_REF
                .captures_iter(line)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();
            pending = match names.as_slice() {
                [source, target] => Some((source.to_string(), target.to_string())),
                _ => None,
            };
        } else if line.starts_with("CREATE") {
            if let Some((source, target)) = pending.take() {
                let weight = WEIGHT
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(1);
                links.push(GraphFileLink {
                    source,
                    target,
                    weight,
                });
            }
        }
    }

    GraphFile { nodes, links }
}
