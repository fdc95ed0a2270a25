//! Semantic search over the internal catalog.
//!
//! - `codec`: textual encoding of embedding vectors (the durable form)
//! - `ranker`: cosine similarity and ranked result lists
//! - `store`: keeps item text and vectors consistent through mutations

pub mod codec;
pub mod ranker;
mod store;

pub use ranker::{cosine_similarity, rank, ScoredResult};
pub use store::{CatalogStats, CatalogVectorStore};
