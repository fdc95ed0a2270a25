//! AI-assisted text utilities: tagging, classification, summarization,
//! and catalog-grounded question answering.
//!
//! Every operation degrades to a fixed, user-presentable string or list
//! instead of erroring — these outputs go straight to end users, so
//! availability wins over correctness signaling at this boundary.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::catalog::{CatalogStore, Item};
use crate::chat::ChatApi;
use crate::discovery::ai_ranked::parse_book_candidates;
use crate::discovery::ExternalCandidate;
use crate::extract::extract_json_object;

/// Closed category vocabulary; classification picks the first label
/// literally contained in the model reply.
static CATEGORIES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "文學小說",
        "科學技術",
        "歷史傳記",
        "商業管理",
        "教育學習",
        "藝術設計",
        "健康生活",
        "哲學宗教",
        "法律政治",
    ]
});

/// Fallback when no category token matches
const FALLBACK_CATEGORY: &str = "其他";

/// Tags returned whenever tag generation fails in any way
static DEFAULT_TAGS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["一般圖書".to_string(), "推薦閱讀".to_string()]);

/// Separator/stopword set dropped during question keyword extraction
static STOPWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["的", "是", "在", "有", "和", "或", "但", "如果", "因為"]
});

const SUMMARY_FALLBACK: &str = "暫無摘要資訊。";
const ANSWER_FALLBACK: &str = "抱歉，目前無法回答您的問題。請稍後再試或聯繫圖書館管理員。";

/// At most this many keywords from a question
const MAX_QUESTION_KEYWORDS: usize = 5;
/// At most this many grounding items in a question prompt
const MAX_CONTEXT_ITEMS: usize = 5;
/// Description cut-off in grounding context lines, in characters
const CONTEXT_DESCRIPTION_CHARS: usize = 100;

/// Stateless façade over the chat service.
pub struct AssistantService {
    chat: Arc<dyn ChatApi>,
    catalog: Arc<dyn CatalogStore>,
}

impl AssistantService {
    pub fn new(chat: Arc<dyn ChatApi>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { chat, catalog }
    }

    /// Generate 5-8 descriptive tags for an item description.
    ///
    /// Any failure — transport, missing JSON, wrong shape — returns the
    /// fixed default tag set, never an empty list.
    pub async fn generate_tags(&self, description: &str) -> Vec<String> {
        let prompt = format!(
            "請為以下書籍描述生成5-8個相關標籤：\n\n\
             描述：{description}\n\n\
             請生成能準確描述書籍主題、類型、特色的標籤。\n\
             以JSON格式回答：{{\"tags\": [\"標籤1\", \"標籤2\", ...]}}"
        );

        let response = match self.chat.complete("標籤生成器", &prompt).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("tag generation failed: {err}");
                return DEFAULT_TAGS.clone();
            }
        };

        let tags = extract_json_object(&response)
            .and_then(|value| {
                let arr = value.get("tags")?.as_array()?.clone();
                Some(
                    arr.iter()
                        .filter_map(|t| t.as_str())
                        .filter(|t| !t.is_empty())
                        .map(str::to_owned)
                        .collect::<Vec<_>>(),
                )
            })
            .unwrap_or_default();

        if tags.is_empty() {
            log::info!("tag response unusable; falling back to defaults");
            DEFAULT_TAGS.clone()
        } else {
            tags
        }
    }

    /// Classify a book into the closed category vocabulary.
    pub async fn classify_category(&self, title: &str, description: &str) -> String {
        let vocabulary = CATEGORIES.join("、");
        let prompt = format!(
            "請將以下書籍分類到最合適的類別：\n\n\
             書名：{title}\n\
             描述：{description}\n\n\
             請從以下類別中選擇最合適的：\n\
             {vocabulary}、{FALLBACK_CATEGORY}\n\n\
             只需回答類別名稱。"
        );

        let response = match self.chat.complete("書籍分類器", &prompt).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("classification failed: {err}");
                return FALLBACK_CATEGORY.to_string();
            }
        };

        Self::extract_category(&response)
    }

    /// First vocabulary label literally contained in the reply text.
    fn extract_category(response: &str) -> String {
        for category in CATEGORIES.iter() {
            if response.contains(category) {
                return (*category).to_string();
            }
        }
        FALLBACK_CATEGORY.to_string()
    }

    /// Produce a short summary. The model text is returned verbatim; any
    /// failure yields the fixed placeholder, never an empty string.
    pub async fn summarize(&self, title: &str, description: &str) -> String {
        let prompt = format!(
            "請為以下書籍生成一個簡潔的摘要（100-150字）：\n\n\
             書名：{title}\n\
             描述：{description}\n\n\
             請突出書籍的核心價值、主要內容和適讀對象。"
        );

        match self.chat.complete("摘要生成器", &prompt).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("summary generation failed: {err}");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    /// Answer a question grounded in the catalog's holdings.
    ///
    /// Relevant items are found by naive keyword matching and included
    /// in the prompt as context. Any failure yields the fixed apology.
    pub async fn answer_question(&self, question: &str) -> String {
        let context = match self.relevant_items(question) {
            Ok(items) => Self::format_context(&items),
            Err(err) => {
                log::warn!("catalog lookup for question failed: {err}");
                return ANSWER_FALLBACK.to_string();
            }
        };

        let prompt = format!(
            "基於以下圖書館藏書資訊回答問題：\n\n\
             圖書館藏書：\n{context}\n\n\
             使用者問題：{question}\n\n\
             請基於圖書館的實際藏書提供準確、有用的回答。\
             如果圖書館沒有相關書籍，請誠實告知並建議可能的替代方案。"
        );

        match self.chat.complete("圖書館助手", &prompt).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("question answering failed: {err}");
                ANSWER_FALLBACK.to_string()
            }
        }
    }

    /// Recommend items similar to an existing catalog item.
    ///
    /// The target's title and description prompt the chat service for
    /// recommendations in the same `{"books": [...]}` reply shape the
    /// discovery tier uses. An unknown id yields an empty list; a chat
    /// failure or unusable reply falls back to other catalog holdings
    /// so the caller still gets something to show.
    pub async fn similar_items(&self, id: u64, count: usize) -> Vec<ExternalCandidate> {
        let target = match self.catalog.get(id) {
            Ok(Some(item)) => item,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("catalog lookup for similar items failed: {err}");
                return Vec::new();
            }
        };

        let prompt = format!(
            "基於以下書籍資訊，請推薦{count}本相似的書籍：\n\n\
             目標書籍：\n\
             - 標題：{title}\n\
             - 描述：{description}\n\n\
             請推薦在主題、風格、或內容上相似的書籍。\n\
             以JSON格式回答：\n\
             {{\"books\": [{{\"title\": \"書名\", \"author\": \"作者\", \
             \"description\": \"簡介\", \"publishYear\": \"出版年份\", \
             \"isbn\": \"ISBN\"}}]}}",
            title = target.title,
            description = target.description,
        );

        let candidates = match self.chat.complete("書籍推薦助手", &prompt).await {
            Ok(text) => extract_json_object(&text)
                .map(|value| parse_book_candidates(&value))
                .unwrap_or_default(),
            Err(err) => {
                log::warn!("similar item recommendation failed: {err}");
                Vec::new()
            }
        };

        if candidates.is_empty() {
            self.holdings_fallback(target.id, count)
        } else {
            candidates
        }
    }

    /// Other catalog holdings presented as candidates, in insertion
    /// order. Degraded stand-in when no real recommendation came back.
    fn holdings_fallback(&self, exclude_id: u64, count: usize) -> Vec<ExternalCandidate> {
        let items = match self.catalog.find(&|item| item.id != exclude_id) {
            Ok(items) => items,
            Err(err) => {
                log::warn!("fallback holdings lookup failed: {err}");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .take(count)
            .map(|item| ExternalCandidate {
                title: item.title,
                description: item.description,
                ..Default::default()
            })
            .collect()
    }

    /// Items whose title or description contains any question keyword.
    fn relevant_items(&self, question: &str) -> Result<Vec<Item>, crate::catalog::CatalogError> {
        let keywords = extract_keywords(question);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = self.catalog.find(&|item| {
            keywords
                .iter()
                .any(|k| item.title.contains(k) || item.description.contains(k))
        })?;
        items.truncate(MAX_CONTEXT_ITEMS);
        Ok(items)
    }

    fn format_context(items: &[Item]) -> String {
        items
            .iter()
            .map(|item| {
                let preview: String = item
                    .description
                    .chars()
                    .take(CONTEXT_DESCRIPTION_CHARS)
                    .collect();
                // Ellipsis only when text was actually cut
                if item.description.chars().count() > CONTEXT_DESCRIPTION_CHARS {
                    format!("《{}》- {preview}...", item.title)
                } else {
                    format!("《{}》- {preview}", item.title)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split a question on spaces and CJK punctuation, drop one-character
/// tokens and stopwords, keep the first few.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split([' ', '，', '。', '？', '！'])
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.iter().any(|s| s == w))
        .take(MAX_QUESTION_KEYWORDS)
        .map(str::to_owned)
        .collect()
}
