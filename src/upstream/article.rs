//! Upstream Payload Types
//!
//! Partially-typed views of the news API's JSON documents. Only the fields
//! the proxy relies on are declared; everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title the upstream uses for articles that were taken down.
pub const REMOVED_SENTINEL: &str = "[Removed]";

// == Raw Shapes ==
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Article as received; any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Article list as received. Entries stay untyped until validated so one
/// malformed article cannot reject the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticlesPayload {
    #[serde(default)]
    pub articles: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourcesPayload {
    #[serde(default)]
    pub sources: Vec<Value>,
}

// == Validated Shapes ==
/// Article that passed the completeness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub description: String,
    pub url: String,
    pub url_to_image: String,
    pub published_at: Option<String>,
    pub source: Option<ArticleSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Filtered article list. `total_results` always equals `articles.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesPayload {
    pub status: String,
    pub total_results: usize,
    pub articles: Vec<ArticleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesPayload {
    pub status: String,
    pub total_results: usize,
    pub sources: Vec<SourceRecord>,
}

// == Filtering ==
fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

impl RawArticle {
    /// Converts to a record if title, description, url and image are all
    /// present and the title is not the removal sentinel.
    pub fn validate(self) -> Option<ArticleRecord> {
        let title = present(self.title)?;
        if title.trim() == REMOVED_SENTINEL {
            return None;
        }

        Some(ArticleRecord {
            title,
            description: present(self.description)?,
            url: present(self.url)?,
            url_to_image: present(self.url_to_image)?,
            published_at: self.published_at,
            source: self.source,
            author: present(self.author),
        })
    }
}

impl RawArticlesPayload {
    /// Drops incomplete articles and recounts the total.
    ///
    /// The upstream's own `totalResults` is discarded: the reported total
    /// is the number of articles actually returned.
    pub fn filter(self) -> ArticlesPayload {
        let articles: Vec<ArticleRecord> = self
            .articles
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<RawArticle>(raw).ok())
            .filter_map(RawArticle::validate)
            .collect();

        ArticlesPayload {
            status: "ok".to_string(),
            total_results: articles.len(),
            articles,
        }
    }
}

impl RawSourcesPayload {
    /// Keeps sources that carry both an id and a name.
    pub fn filter(self) -> SourcesPayload {
        let sources: Vec<SourceRecord> = self
            .sources
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<RawSource>(raw).ok())
            .filter_map(|s| {
                Some(SourceRecord {
                    id: present(s.id)?,
                    name: present(s.name)?,
                    description: s.description,
                    url: s.url,
                    category: s.category,
                    language: s.language,
                    country: s.country,
                })
            })
            .collect();

        SourcesPayload {
            status: "ok".to_string(),
            total_results: sources.len(),
            sources,
        }
    }
}
