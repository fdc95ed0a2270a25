//! Tier 1: AI-ranked discovery through the chat service.
//!
//! Asks the model for book recommendations and expects a JSON object of
//! the form `{"books": [{title, author, description, publishYear,
//! isbn}]}` embedded somewhere in the reply. A reply that cannot be
//! parsed counts as an empty result (advancing the fallback chain);
//! only transport-level failures surface as errors.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::chat::{ChatApi, ChatError};
use crate::discovery::{DiscoveryError, DiscoveryTier, ExternalCandidate};
use crate::extract::extract_json_object;

/// How many candidates to ask the model for
const DEFAULT_CANDIDATE_COUNT: usize = 10;

const SYSTEM_ROLE: &str = "書籍推薦助手";

pub struct AiRankedTier {
    chat: Arc<dyn ChatApi>,
    count: usize,
}

impl AiRankedTier {
    pub fn new(chat: Arc<dyn ChatApi>) -> Self {
        Self {
            chat,
            count: DEFAULT_CANDIDATE_COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    fn build_prompt(&self, query: &str) -> String {
        format!(
            "請推薦{count}本與「{query}」相關的書籍。\n\n\
             請以JSON格式回答：\n\
             {{\"books\": [{{\"title\": \"書名\", \"author\": \"作者\", \
             \"description\": \"簡介\", \"publishYear\": \"出版年份\", \
             \"isbn\": \"ISBN\"}}]}}",
            count = self.count,
        )
    }

}

/// Parse the `books` array out of an extracted JSON object.
/// Entries without a title are skipped. Also used by the assistant's
/// similar-item recommendations, which speak the same reply shape.
pub(crate) fn parse_book_candidates(value: &Value) -> Vec<ExternalCandidate> {
    let Some(books) = value.get("books").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    books
        .iter()
        .filter_map(|book| {
            let title = book.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            Some(ExternalCandidate {
                title: title.to_string(),
                description: string_field(book, "description"),
                author: string_field(book, "author"),
                isbn: string_field(book, "isbn"),
                publish_year: string_field(book, "publishYear"),
                cover_image: String::new(),
            })
        })
        .collect()
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl DiscoveryTier for AiRankedTier {
    fn name(&self) -> &'static str {
        "ai-ranked"
    }

    async fn discover(&self, query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
        let response = match self.chat.complete(SYSTEM_ROLE, &self.build_prompt(query)).await {
            Ok(text) => text,
            // An unconfigured chat client is a quiet no-op tier, not a
            // transport failure worth alarming about
            Err(ChatError::Unconfigured) => {
                log::debug!("chat api unconfigured; ai-ranked tier inactive");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        match extract_json_object(&response) {
            Some(value) => Ok(parse_book_candidates(&value)),
            None => {
                log::info!("ai-ranked reply had no parseable JSON object");
                Ok(Vec::new())
            }
        }
    }
}
