//! Semantic retrieval and recommendation engine for a catalog of books.
//!
//! The crate converts free text into embeddings via a remote service,
//! ranks catalog items by cosine similarity, discovers external candidates
//! through an ordered fallback chain, and wraps a generative text service
//! behind four defensive utilities (tags, category, summary, Q&A).
//!
//! Persistence, authentication, and request routing are external
//! collaborators; the catalog is consumed through the
//! [`catalog::CatalogStore`] trait only.

pub mod assistant;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod discovery;
pub mod embedding;
pub mod extract;
pub mod semantic;
#[cfg(test)]
mod tests;

pub use assistant::AssistantService;
pub use catalog::{CatalogError, CatalogStore, Item, MemoryCatalog, NewItem};
pub use chat::{ChatApi, ChatError, HttpChatClient};
pub use config::EngineConfig;
pub use discovery::{DiscoveryTier, ExternalCandidate, MultiTierSearch};
pub use embedding::{Embedder, HttpEmbeddingClient};
pub use semantic::{CatalogVectorStore, ScoredResult};
