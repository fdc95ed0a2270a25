//! Tier 3: static placeholder candidates.
//!
//! Last resort when every real source failed or came back empty. The
//! candidates are seeded with the literal query text so the caller's
//! display still reflects what was asked for. This tier cannot fail.

use async_trait::async_trait;

use crate::discovery::{DiscoveryError, DiscoveryTier, ExternalCandidate};

pub struct PlaceholderTier;

impl PlaceholderTier {
    pub fn new() -> Self {
        Self
    }

    fn candidates_for(query: &str) -> Vec<ExternalCandidate> {
        vec![
            ExternalCandidate {
                title: format!("關於「{query}」的書籍範例 1"),
                description: "這是一本關於您搜尋主題的範例書籍。包含豐富的內容和實用的知識。"
                    .to_string(),
                author: "範例作者".to_string(),
                publish_year: "2023".to_string(),
                isbn: "9780000000000".to_string(),
                cover_image: String::new(),
            },
            ExternalCandidate {
                title: format!("「{query}」進階指南"),
                description: "深入探討相關主題的進階指南，適合想要深入了解的讀者。".to_string(),
                author: "專業作者".to_string(),
                publish_year: "2024".to_string(),
                isbn: "9780000000001".to_string(),
                cover_image: String::new(),
            },
        ]
    }
}

impl Default for PlaceholderTier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiscoveryTier for PlaceholderTier {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn discover(&self, query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
        Ok(Self::candidates_for(query))
    }
}
