// Article and source catalogue types.
//
// Articles are immutable once ingested. The source catalogue is derived from
// the article set and handed to every query as a read-only snapshot, so a
// rebuild never races with query serving.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ArticleId = i64;
pub type SourceId = i64;

/// A single news article, one per input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    /// Publishing outlet, the aggregation unit for the source graph
    pub source: String,
    pub title: String,
    pub author: String,
    /// None when no date could be recovered from the article header.
    /// Undated articles never take part in reference inference.
    pub publish_date: Option<NaiveDate>,
    pub location: String,
    pub content: String,
}

/// A publishing outlet with its stable catalogue id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
}

/// Derive the source list for a set of articles.
///
/// Ids are assigned densely from 0 in ascending name order, so re-ingesting
/// the same corpus always yields the same ids.
pub fn derive_sources(articles: &[Article]) -> Vec<Source> {
    let names: BTreeSet<&str> = articles.iter().map(|a| a.source.as_str()).collect();
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Source {
            id: i as SourceId,
            name: name.to_string(),
        })
        .collect()
}

/// Read-only snapshot of every known source plus the article→source lookup.
///
/// This is all a graph query needs from the catalogue; article bodies stay
/// in the store.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalogue {
    sources: Vec<Source>,
    article_sources: HashMap<ArticleId, SourceId>,
}

impl SourceCatalogue {
    /// Build a catalogue from stored parts.
    ///
    /// Fails if an article points at a source id that isn't in the list;
    /// that means the store is inconsistent, not that the data is sparse.
    pub fn new(
        mut sources: Vec<Source>,
        article_sources: impl IntoIterator<Item = (ArticleId, SourceId)>,
    ) -> Result<Self> {
        sources.sort_by_key(|s| s.id);
        let known: BTreeSet<SourceId> = sources.iter().map(|s| s.id).collect();

        let mut map = HashMap::new();
        for (article_id, source_id) in article_sources {
            anyhow::ensure!(
                known.contains(&source_id),
                "article {article_id} references unknown source id {source_id}"
            );
            map.insert(article_id, source_id);
        }

        Ok(Self {
            sources,
            article_sources: map,
        })
    }

    /// Build a catalogue directly from articles (ids from `derive_sources`).
    pub fn from_articles(articles: &[Article]) -> Self {
        let sources = derive_sources(articles);
        let by_name: HashMap<&str, SourceId> =
            sources.iter().map(|s| (s.name.as_str(), s.id)).collect();
        let article_sources = articles
            .iter()
            .map(|a| (a.id, by_name[a.source.as_str()]))
            .collect();
        Self {
            sources,
            article_sources,
        }
    }

    /// All sources in id order, including ones with no articles referenced.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source_of(&self, article_id: ArticleId) -> Option<SourceId> {
        self.article_sources.get(&article_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
