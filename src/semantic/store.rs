//! Coordinates catalog mutations with embedding generation.
//!
//! Every mutation that touches item text regenerates the embedding
//! before the write is considered complete, so no stale vector survives
//! a successful update. A degraded (empty) embedding still commits: an
//! item without a vector is findable by title and location and merely
//! scores zero in semantic search.

use std::sync::Arc;

use crate::catalog::{CatalogError, CatalogStore, Item, NewItem, MAX_LOCATION_LEN, MAX_TITLE_LEN};
use crate::embedding::Embedder;
use crate::semantic::codec;
use crate::semantic::ranker::{self, ScoredResult};

/// Coverage counters for the catalog's vectors.
///
/// Reports raw counts only; any quality scoring policy is the caller's.
#[derive(Debug, Clone, Default)]
pub struct CatalogStats {
    pub total_items: usize,
    pub items_with_vector: usize,
    pub items_without_description: usize,
    /// Dimension of the first stored vector, if any
    pub vector_dimensions: Option<usize>,
    /// True when every stored vector has the same dimension
    pub dimensions_consistent: bool,
}

/// Glue between the catalog store, the embedding client, and the codec.
pub struct CatalogVectorStore {
    catalog: Arc<dyn CatalogStore>,
    embedder: Arc<dyn Embedder>,
}

impl CatalogVectorStore {
    pub fn new(catalog: Arc<dyn CatalogStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { catalog, embedder }
    }

    /// Text fed to the embedding model for an item.
    fn embedding_input(title: &str, description: &str) -> String {
        format!("{title} {description}")
    }

    fn validate_fields(title: &str, location: &str) -> Result<(), CatalogError> {
        if title.trim().is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CatalogError::FieldTooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }
        if location.chars().count() > MAX_LOCATION_LEN {
            return Err(CatalogError::FieldTooLong {
                field: "location",
                max: MAX_LOCATION_LEN,
            });
        }
        Ok(())
    }

    /// Create an item, embedding its text first.
    ///
    /// Embedding degradation does not fail the creation; the item is
    /// committed with an empty vector. Storage failures propagate.
    pub async fn add_item(
        &self,
        title: &str,
        description: &str,
        location: &str,
    ) -> Result<Item, CatalogError> {
        Self::validate_fields(title, location)?;

        let vector = self
            .embedder
            .embed(&Self::embedding_input(title, description))
            .await;
        if vector.is_empty() {
            log::warn!("embedding unavailable for new item '{title}'; storing empty vector");
        }

        let item = self.catalog.insert(NewItem {
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            vector: codec::encode(&vector),
        })?;

        log::info!("added item '{}' (id {})", item.title, item.id);
        Ok(item)
    }

    /// Persist an edited item, recomputing its vector from the current
    /// title and description.
    pub async fn update_item(&self, mut item: Item) -> Result<Item, CatalogError> {
        Self::validate_fields(&item.title, &item.location)?;

        let vector = self
            .embedder
            .embed(&Self::embedding_input(&item.title, &item.description))
            .await;
        item.vector = codec::encode(&vector);

        self.catalog.update(&item)?;
        log::info!("updated item '{}' (id {})", item.title, item.id);
        Ok(item)
    }

    /// Delete an item; the record carries its vector, so both go as one
    /// unit. Returns false if the item did not exist.
    pub async fn delete_item(&self, id: u64) -> Result<bool, CatalogError> {
        let deleted = self.catalog.delete(id)?;
        if deleted {
            log::info!("deleted item id {id}");
        }
        Ok(deleted)
    }

    /// Re-embed every item in the catalog, strictly sequentially.
    ///
    /// Returns the number of items processed. Per-item embedding
    /// degradation is counted as processed; only storage failures abort.
    pub async fn bulk_recompute_vectors(&self) -> Result<usize, CatalogError> {
        let items = self.catalog.all()?;
        let mut processed = 0;

        // Sequential on purpose: parallel fan-out would need embedding
        // service rate-limit accounting this design does not have.
        for mut item in items {
            let vector = self
                .embedder
                .embed(&Self::embedding_input(&item.title, &item.description))
                .await;
            item.vector = codec::encode(&vector);
            self.catalog.update(&item)?;
            processed += 1;
        }

        log::info!("recomputed vectors for {processed} items");
        Ok(processed)
    }

    /// Rank the full catalog against a free-text query.
    ///
    /// The ranking pass always runs; if the query embedding degraded to
    /// empty, every candidate scores zero and input order is preserved.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredResult>, CatalogError> {
        let query_vector = self.embedder.embed(query).await;
        if query_vector.is_empty() {
            log::warn!("no query embedding for '{query}'; results will be unranked");
        }

        let items = self.catalog.all()?;
        Ok(ranker::rank(&query_vector, items, limit))
    }

    /// Exact-match scan on the location tag.
    pub fn search_by_location(&self, location: &str) -> Result<Vec<ScoredResult>, CatalogError> {
        let items = self.catalog.find(&|item| item.location == location)?;
        Ok(Self::constant_score_results(items))
    }

    /// Substring scan on the title.
    pub fn search_by_title(&self, title: &str) -> Result<Vec<ScoredResult>, CatalogError> {
        let items = self.catalog.find(&|item| item.title.contains(title))?;
        Ok(Self::constant_score_results(items))
    }

    fn constant_score_results(items: Vec<Item>) -> Vec<ScoredResult> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| ScoredResult {
                item,
                score: 1.0,
                rank: i + 1,
            })
            .collect()
    }

    /// Vector coverage counters over the whole catalog.
    pub fn catalog_stats(&self) -> Result<CatalogStats, CatalogError> {
        let items = self.catalog.all()?;

        let mut stats = CatalogStats {
            total_items: items.len(),
            dimensions_consistent: true,
            ..Default::default()
        };

        for item in &items {
            if item.description.is_empty() {
                stats.items_without_description += 1;
            }
            let vector = codec::decode(&item.vector);
            if vector.is_empty() {
                continue;
            }
            stats.items_with_vector += 1;
            match stats.vector_dimensions {
                None => stats.vector_dimensions = Some(vector.len()),
                Some(d) if d != vector.len() => stats.dimensions_consistent = false,
                Some(_) => {}
            }
        }

        Ok(stats)
    }
}
