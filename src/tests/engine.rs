//! End-to-end scenarios: catalog mutation feeding semantic search,
//! discovery fallback feeding catalog promotion, and assistant flows.

use async_trait::async_trait;
use std::sync::Arc;

use crate::assistant::AssistantService;
use crate::catalog::MemoryCatalog;
use crate::chat::{ChatApi, ChatError};
use crate::discovery::{
    DiscoveryError, DiscoveryTier, ExternalCandidate, MultiTierSearch, PlaceholderTier,
};
use crate::embedding::Embedder;
use crate::semantic::CatalogVectorStore;

/// Embedder with a tiny hand-built vocabulary: texts mentioning known
/// topics get axis-aligned vectors, everything else a diagonal one.
struct TopicEmbedder;

#[async_trait]
impl Embedder for TopicEmbedder {
    async fn embed(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut v = vec![0.1f32, 0.1, 0.1];
        if text.contains("space") || text.contains("科幻") {
            v[0] = 1.0;
        }
        if text.contains("history") || text.contains("歷史") {
            v[1] = 1.0;
        }
        if text.contains("cooking") || text.contains("烹飪") {
            v[2] = 1.0;
        }
        v
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Embedder standing in for a dead embedding service.
struct DeadEmbedder;

#[async_trait]
impl Embedder for DeadEmbedder {
    async fn embed(&self, _text: &str) -> Vec<f32> {
        Vec::new()
    }

    fn dimensions(&self) -> usize {
        0
    }
}

struct DeadChat;

#[async_trait]
impl ChatApi for DeadChat {
    async fn complete(&self, _role: &str, _prompt: &str) -> Result<String, ChatError> {
        Err(ChatError::Status(502))
    }
}

#[tokio::test]
async fn test_semantic_search_ranks_topically() {
    let catalog = Arc::new(MemoryCatalog::new());
    let store = CatalogVectorStore::new(catalog.clone(), Arc::new(TopicEmbedder));

    store.add_item("Dune", "space opera", "A1").await.unwrap();
    store
        .add_item("SPQR", "history of Rome", "B2")
        .await
        .unwrap();
    store
        .add_item("Salt Fat Acid Heat", "cooking fundamentals", "C3")
        .await
        .unwrap();

    let results = store.search("space adventure", 10).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].item.title, "Dune");
    assert_eq!(results[0].rank, 1);
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn test_dune_survives_embedding_outage_and_scores_zero() {
    // Embedding service down at creation time
    let catalog = Arc::new(MemoryCatalog::new());
    let store = CatalogVectorStore::new(catalog.clone(), Arc::new(DeadEmbedder));

    let item = store.add_item("Dune", "space opera", "").await.unwrap();
    assert_eq!(item.title, "Dune");
    assert_eq!(crate::semantic::codec::decode(&item.vector).len(), 0);

    let results = store.search("space opera", 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0.0);
    assert_eq!(results[0].rank, 1);
}

#[tokio::test]
async fn test_mixed_catalog_zero_vector_items_sort_last() {
    let catalog = Arc::new(MemoryCatalog::new());

    // One item created while embeddings were down
    let degraded = CatalogVectorStore::new(catalog.clone(), Arc::new(DeadEmbedder));
    degraded.add_item("Unembedded", "space", "").await.unwrap();

    // Then the service recovers
    let healthy = CatalogVectorStore::new(catalog.clone(), Arc::new(TopicEmbedder));
    healthy.add_item("Dune", "space opera", "").await.unwrap();

    let results = healthy.search("space", 10).await.unwrap();
    assert_eq!(results[0].item.title, "Dune");
    assert_eq!(results[1].item.title, "Unembedded");
    assert_eq!(results[1].score, 0.0);
}

#[tokio::test]
async fn test_bulk_recompute_repairs_missing_vectors() {
    let catalog = Arc::new(MemoryCatalog::new());

    let degraded = CatalogVectorStore::new(catalog.clone(), Arc::new(DeadEmbedder));
    degraded.add_item("Dune", "space opera", "").await.unwrap();
    degraded.add_item("SPQR", "history", "").await.unwrap();

    let healthy = CatalogVectorStore::new(catalog.clone(), Arc::new(TopicEmbedder));
    let processed = healthy.bulk_recompute_vectors().await.unwrap();
    assert_eq!(processed, 2);

    let stats = healthy.catalog_stats().unwrap();
    assert_eq!(stats.items_with_vector, 2);
    assert_eq!(stats.vector_dimensions, Some(3));
    assert!(stats.dimensions_consistent);
}

#[tokio::test]
async fn test_discovered_candidate_promotes_into_catalog() {
    struct OneBookTier;

    #[async_trait]
    impl DiscoveryTier for OneBookTier {
        fn name(&self) -> &'static str {
            "one-book"
        }

        async fn discover(&self, _q: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
            Ok(vec![ExternalCandidate {
                title: "三體".to_string(),
                description: "科幻小說".to_string(),
                author: "劉慈欣".to_string(),
                isbn: "9787536692930".to_string(),
                publish_year: "2008".to_string(),
                cover_image: String::new(),
            }])
        }
    }

    let search = MultiTierSearch::with_tiers(vec![Box::new(OneBookTier)]);
    let candidates = search.discover("科幻").await;
    assert_eq!(candidates.len(), 1);

    // Promotion: the external candidate becomes a catalog item and is
    // embedded like any other mutation
    let catalog = Arc::new(MemoryCatalog::new());
    let store = CatalogVectorStore::new(catalog.clone(), Arc::new(TopicEmbedder));

    let candidate = &candidates[0];
    let description = format!(
        "{}\n\n作者：{}\nISBN：{}\n出版年份：{}",
        candidate.description, candidate.author, candidate.isbn, candidate.publish_year
    );
    let item = store
        .add_item(&candidate.title, &description, "")
        .await
        .unwrap();

    assert_eq!(item.title, "三體");
    let results = store.search("科幻", 5).await.unwrap();
    assert_eq!(results[0].item.id, item.id);
    assert!(results[0].score > 0.9);
}

#[tokio::test]
async fn test_full_fallback_to_placeholders_when_everything_is_down() {
    struct DownTier;

    #[async_trait]
    impl DiscoveryTier for DownTier {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn discover(&self, _q: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
            Err(DiscoveryError::Status(500))
        }
    }

    let search = MultiTierSearch::with_tiers(vec![
        Box::new(DownTier),
        Box::new(DownTier),
        Box::new(PlaceholderTier::new()),
    ]);

    let candidates = search.discover("量子力學").await;
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].title.contains("量子力學"));
}

#[tokio::test]
async fn test_assistant_degrades_gracefully_when_chat_is_down() {
    let catalog = Arc::new(MemoryCatalog::new());
    let assistant = AssistantService::new(Arc::new(DeadChat), catalog.clone());

    let tags = assistant.generate_tags("任何描述").await;
    assert_eq!(tags, vec!["一般圖書", "推薦閱讀"]);

    assert_eq!(assistant.classify_category("書", "描述").await, "其他");
    assert_eq!(assistant.summarize("書", "描述").await, "暫無摘要資訊。");
    assert_eq!(
        assistant.answer_question("有什麼推薦？").await,
        "抱歉，目前無法回答您的問題。請稍後再試或聯繫圖書館管理員。"
    );
}

#[tokio::test]
async fn test_concurrent_searches_share_the_store() {
    let catalog = Arc::new(MemoryCatalog::new());
    let store = Arc::new(CatalogVectorStore::new(
        catalog.clone(),
        Arc::new(TopicEmbedder),
    ));
    store.add_item("Dune", "space opera", "").await.unwrap();
    store.add_item("SPQR", "history", "").await.unwrap();

    let a = {
        let store = store.clone();
        tokio::spawn(async move { store.search("space", 5).await.unwrap() })
    };
    let b = {
        let store = store.clone();
        tokio::spawn(async move { store.search("history", 5).await.unwrap() })
    };

    let (space, history) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(space[0].item.title, "Dune");
    assert_eq!(history[0].item.title, "SPQR");
}
