//! Tier 2: structured keyword search against a volumes API
//! (Google-Books-style wire format).
//!
//! Response fields are walked defensively: anything missing becomes a
//! default value and titleless entries are dropped. Only identifiers
//! typed ISBN_13 or ISBN_10 are accepted; thumbnails beat small
//! thumbnails for the cover reference.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::VolumesConfig;
use crate::discovery::{DiscoveryError, DiscoveryTier, ExternalCandidate};

const UNKNOWN_AUTHOR: &str = "未知作者";

pub struct VolumesTier {
    client: reqwest::Client,
    config: VolumesConfig,
}

impl VolumesTier {
    pub fn new(config: VolumesConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn parse_items(body: &Value) -> Vec<ExternalCandidate> {
        let Some(items) = body.get("items").and_then(|v| v.as_array()) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let info = item.get("volumeInfo")?;
                let title = info.get("title")?.as_str()?.trim();
                if title.is_empty() {
                    return None;
                }
                Some(ExternalCandidate {
                    title: title.to_string(),
                    description: string_of(info, "description"),
                    author: authors_string(info),
                    isbn: isbn_string(info),
                    publish_year: string_of(info, "publishedDate"),
                    cover_image: cover_image_url(info),
                })
            })
            .collect()
    }
}

fn string_of(info: &Value, key: &str) -> String {
    info.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Join the authors array with ", "; unknown when absent or empty.
fn authors_string(info: &Value) -> String {
    let names: Vec<&str> = info
        .get("authors")
        .and_then(|v| v.as_array())
        .map(|authors| authors.iter().filter_map(|a| a.as_str()).collect())
        .unwrap_or_default();

    if names.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        names.join(", ")
    }
}

/// First identifier typed ISBN_13 or ISBN_10.
fn isbn_string(info: &Value) -> String {
    let Some(identifiers) = info.get("industryIdentifiers").and_then(|v| v.as_array()) else {
        return String::new();
    };

    for identifier in identifiers {
        let kind = identifier.get("type").and_then(|v| v.as_str());
        if matches!(kind, Some("ISBN_13") | Some("ISBN_10")) {
            if let Some(value) = identifier.get("identifier").and_then(|v| v.as_str()) {
                return value.to_string();
            }
        }
    }
    String::new()
}

/// Thumbnail preferred over smallThumbnail.
fn cover_image_url(info: &Value) -> String {
    let Some(links) = info.get("imageLinks") else {
        return String::new();
    };

    links
        .get("thumbnail")
        .or_else(|| links.get("smallThumbnail"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl DiscoveryTier for VolumesTier {
    fn name(&self) -> &'static str {
        "volumes"
    }

    async fn discover(&self, query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
        let max_results = self.config.max_results.to_string();
        let mut params = vec![("q", query), ("maxResults", max_results.as_str())];
        if let Some(lang) = self.config.lang_restrict.as_deref() {
            params.push(("langRestrict", lang));
        }

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_items(&body))
    }
}
