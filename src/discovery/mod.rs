//! External discovery with ordered tier fallback.
//!
//! Tiers are attempted in registration order; the first non-empty
//! output wins and later tiers are never invoked. A tier advancing the
//! chain on *either* an error or an empty result is deliberate — an AI
//! ranker that answers with no usable candidates is as exhausted as one
//! that timed out. The final placeholder tier cannot fail, so
//! [`MultiTierSearch::discover`] never surfaces an error.

pub mod ai_ranked;
pub mod placeholder;
pub mod volumes;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::chat::{ChatApi, ChatError};
use crate::config::VolumesConfig;

pub use ai_ranked::AiRankedTier;
pub use placeholder::PlaceholderTier;
pub use volumes::VolumesTier;

/// A loosely structured candidate from an external source. It has no
/// internal identity unless promoted into a catalog item by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalCandidate {
    pub title: String,
    pub description: String,
    pub author: String,
    pub isbn: String,
    pub publish_year: String,
    pub cover_image: String,
}

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("reqwest error: {0:?}")]
    Transport(#[from] reqwest::Error),

    #[error("discovery service returned status {0}")]
    Status(u16),
}

/// One source of external candidates.
#[async_trait]
pub trait DiscoveryTier: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Fetch candidates for a query. `Ok(vec![])` means "nothing found,
    /// try the next tier"; `Err` means the tier itself failed.
    async fn discover(&self, query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError>;
}

/// Ordered fallback chain over discovery tiers.
pub struct MultiTierSearch {
    tiers: Vec<Box<dyn DiscoveryTier>>,
}

impl MultiTierSearch {
    /// Standard three-tier chain: AI-ranked, structured keyword search,
    /// static placeholders.
    pub fn new(chat: Arc<dyn ChatApi>, volumes_config: VolumesConfig) -> Self {
        Self::with_tiers(vec![
            Box::new(AiRankedTier::new(chat)),
            Box::new(VolumesTier::new(volumes_config)),
            Box::new(PlaceholderTier::new()),
        ])
    }

    /// Custom tier chain, attempted in the given order.
    pub fn with_tiers(tiers: Vec<Box<dyn DiscoveryTier>>) -> Self {
        Self { tiers }
    }

    /// Find external candidates for a free-text query.
    ///
    /// Blank queries short-circuit to an empty list before any network
    /// call. Otherwise the tiers run in order until one yields a
    /// non-empty result.
    pub async fn discover(&self, query: &str) -> Vec<ExternalCandidate> {
        let query = query.trim();
        if query.is_empty() {
            log::debug!("blank discovery query; skipping all tiers");
            return Vec::new();
        }

        for tier in &self.tiers {
            let name = tier.name();
            match tier.discover(query).await {
                Ok(candidates) if !candidates.is_empty() => {
                    log::info!("tier={name} outcome=success count={}", candidates.len());
                    return candidates;
                }
                Ok(_) => {
                    log::info!("tier={name} outcome=empty");
                }
                Err(err) => {
                    log::warn!("tier={name} outcome=error err={err}");
                }
            }
        }

        // Reachable only without the placeholder tier registered
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct EmptyTier {
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DiscoveryTier for EmptyTier {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn discover(&self, _query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingTier {
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DiscoveryTier for FailingTier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn discover(&self, _query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
            self.called.store(true, Ordering::SeqCst);
            Err(DiscoveryError::Status(503))
        }
    }

    struct YieldingTier {
        called: Arc<AtomicBool>,
        title: &'static str,
    }

    #[async_trait]
    impl DiscoveryTier for YieldingTier {
        fn name(&self) -> &'static str {
            "yielding"
        }

        async fn discover(&self, _query: &str) -> Result<Vec<ExternalCandidate>, DiscoveryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(vec![ExternalCandidate {
                title: self.title.to_string(),
                ..Default::default()
            }])
        }
    }

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[tokio::test]
    async fn test_first_nonempty_tier_wins() {
        let (first, second) = (flag(), flag());
        let search = MultiTierSearch::with_tiers(vec![
            Box::new(YieldingTier {
                called: first.clone(),
                title: "from tier one",
            }),
            Box::new(YieldingTier {
                called: second.clone(),
                title: "never seen",
            }),
        ]);

        let results = search.discover("query").await;
        assert_eq!(results[0].title, "from tier one");
        assert!(first.load(Ordering::SeqCst));
        assert!(!second.load(Ordering::SeqCst), "later tier must not run");
    }

    #[tokio::test]
    async fn test_empty_result_advances_chain() {
        let (first, second) = (flag(), flag());
        let search = MultiTierSearch::with_tiers(vec![
            Box::new(EmptyTier {
                called: first.clone(),
            }),
            Box::new(YieldingTier {
                called: second.clone(),
                title: "fallback hit",
            }),
        ]);

        let results = search.discover("query").await;
        assert_eq!(results[0].title, "fallback hit");
        assert!(first.load(Ordering::SeqCst));
        assert!(second.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_error_advances_chain() {
        let (first, second) = (flag(), flag());
        let search = MultiTierSearch::with_tiers(vec![
            Box::new(FailingTier {
                called: first.clone(),
            }),
            Box::new(YieldingTier {
                called: second.clone(),
                title: "after failure",
            }),
        ]);

        let results = search.discover("query").await;
        assert_eq!(results[0].title, "after failure");
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_placeholders() {
        // Tier 1 empty, Tier 2 transport failure, Tier 3 placeholders
        let search = MultiTierSearch::with_tiers(vec![
            Box::new(EmptyTier { called: flag() }),
            Box::new(FailingTier { called: flag() }),
            Box::new(PlaceholderTier::new()),
        ]);

        let results = search.discover("history").await;
        assert!(!results.is_empty());
        assert!(results.iter().all(|c| c.title.contains("history")));
    }

    #[tokio::test]
    async fn test_blank_query_short_circuits() {
        let called = flag();
        let search = MultiTierSearch::with_tiers(vec![Box::new(YieldingTier {
            called: called.clone(),
            title: "x",
        })]);

        assert!(search.discover("   ").await.is_empty());
        assert!(!called.load(Ordering::SeqCst), "no tier may run on blank query");
    }

    #[tokio::test]
    async fn test_all_tiers_exhausted_yields_empty() {
        let search = MultiTierSearch::with_tiers(vec![
            Box::new(EmptyTier { called: flag() }),
            Box::new(FailingTier { called: flag() }),
        ]);

        assert!(search.discover("query").await.is_empty());
    }
}
