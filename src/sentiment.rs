// Sentiment pivots: per-outlet and per-entity views over precomputed
// entity sentiment.
//
// Input is one record per (article, entity) mention, with the sentiment
// already scored upstream. Nothing here computes sentiment; it only groups
// and averages. Missing values are skipped the way a spreadsheet pivot
// would: a record without an entity never forms a group, a record without a
// score doesn't drag the mean, and the representative content is the first
// non-empty one in input order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One entity mention with its sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub entities: Option<String>,
    #[serde(default)]
    pub entity_sentiment: Option<f64>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One bar in a pivot: the group key, its mean sentiment, and a sample text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub x: String,
    /// None when no record in the group carries a score
    pub y: Option<f64>,
    pub content: Option<String>,
}

/// Column-oriented form of a per-source pivot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceHeatmap {
    pub entities: Vec<String>,
    pub sentiments: Vec<Option<f64>>,
    pub contents: Vec<Option<String>>,
}

/// The loaded record table.
#[derive(Debug, Clone, Default)]
pub struct SentimentTable {
    records: Vec<SentimentRecord>,
}

#[derive(Default)]
struct Group {
    sum: f64,
    scored: usize,
    content: Option<String>,
}

impl SentimentTable {
    pub fn new(records: Vec<SentimentRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records.
    pub fn from_json(text: &str) -> Result<Self> {
        let records: Vec<SentimentRecord> =
            serde_json::from_str(text).context("Failed to parse sentiment records")?;
        Ok(Self::new(records))
    }

    /// Parse a headed CSV table. Empty cells read as missing values and
    /// columns other than the four record fields are ignored.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let records = reader
            .deserialize::<SentimentRecord>()
            .enumerate()
            .map(|(row, record)| {
                record.with_context(|| format!("Failed to parse sentiment row {}", row + 1))
            })
            .collect::<Result<Vec<SentimentRecord>>>()?;
        Ok(Self::new(records))
    }

    /// Load records from disk: CSV for a `.csv` file, a JSON array otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sentiment file {}", path.display()))?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let table = if is_csv {
            Self::from_csv(&text)?
        } else {
            Self::from_json(&text)?
        };
        info!(records = table.len(), path = %path.display(), "Loaded sentiment records");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct entity names, sorted.
    pub fn entities(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.entities.as_deref()))
    }

    /// Distinct source names, sorted.
    pub fn sources(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.source.as_deref()))
    }

    /// Mean sentiment per entity, for one outlet.
    pub fn by_source(&self, source: &str) -> Vec<PivotPoint> {
        if source.is_empty() {
            return Vec::new();
        }
        pivot(
            self.records
                .iter()
                .filter(|r| r.source.as_deref() == Some(source)),
            |r| r.entities.as_deref(),
        )
    }

    /// Mean sentiment per outlet, for one entity.
    pub fn by_entity(&self, entity: &str) -> Vec<PivotPoint> {
        if entity.is_empty() {
            return Vec::new();
        }
        pivot(
            self.records
                .iter()
                .filter(|r| r.entities.as_deref() == Some(entity)),
            |r| r.source.as_deref(),
        )
    }

    /// Same as `by_source`, split into parallel columns.
    pub fn source_heatmap(&self, source: &str) -> SourceHeatmap {
        let mut heatmap = SourceHeatmap::default();
        for point in self.by_source(source) {
            heatmap.entities.push(point.x);
            heatmap.sentiments.push(point.y);
            heatmap.contents.push(point.content);
        }
        heatmap
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn pivot<'a>(
    records: impl Iterator<Item = &'a SentimentRecord>,
    key: impl Fn(&SentimentRecord) -> Option<&str>,
) -> Vec<PivotPoint> {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for record in records {
        let Some(k) = key(record).filter(|k| !k.is_empty()) else {
            continue;
        };
        let group = groups.entry(k.to_string()).or_default();
        if let Some(score) = record.entity_sentiment.filter(|s| s.is_finite()) {
            group.sum += score;
            group.scored += 1;
        }
        if group.content.is_none() {
            group.content = record.content.clone().filter(|c| !c.is_empty());
        }
    }

    groups
        .into_iter()
        .map(|(x, g)| PivotPoint {
            x,
            y: (g.scored > 0).then(|| g.sum / g.scored as f64),
            content: g.content,
        })
        .collect()
}
