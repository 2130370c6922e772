//! Bounded-retry wrapper around a gateway
//!
//! Transient (`Network`) failures are retried with exponential backoff; every
//! other error passes straight through. The wrapper suspends between attempts
//! without ever blocking the caller's thread.

use crate::error::Result;
use crate::gateway::RemoteGateway;
use async_trait::async_trait;
use cardboard_common::{BoardId, Card, CardId, List, ListId};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for gateway calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// A gateway decorator that retries retryable failures.
pub struct RetryingGateway<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: RemoteGateway> RetryingGateway<G> {
    /// Wrap a gateway with the default policy
    pub fn new(inner: G) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    /// Wrap a gateway with a custom policy
    pub fn with_policy(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Unwrap the inner gateway
    pub fn into_inner(self) -> G {
        self.inner
    }

    async fn run<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let mut attempt = 1u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.base_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        operation = op,
                        attempt,
                        "retryable gateway failure: {err}; backing off {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<G: RemoteGateway> RemoteGateway for RetryingGateway<G> {
    async fn get_lists(&self, board_id: &BoardId) -> Result<Vec<List>> {
        self.run("get_lists", || self.inner.get_lists(board_id))
            .await
    }

    async fn get_cards(&self, list_id: &ListId) -> Result<Vec<Card>> {
        self.run("get_cards", || self.inner.get_cards(list_id))
            .await
    }

    async fn create_list(
        &self,
        board_id: &BoardId,
        name: &str,
        color: Option<&str>,
    ) -> Result<List> {
        self.run("create_list", || {
            self.inner.create_list(board_id, name, color)
        })
        .await
    }

    async fn create_card(&self, list_id: &ListId, title: &str) -> Result<Card> {
        self.run("create_card", || self.inner.create_card(list_id, title))
            .await
    }

    async fn update_list_position(&self, list_id: &ListId, position: usize) -> Result<List> {
        self.run("update_list_position", || {
            self.inner.update_list_position(list_id, position)
        })
        .await
    }

    async fn update_card_position(&self, card_id: &CardId, position: usize) -> Result<Card> {
        self.run("update_card_position", || {
            self.inner.update_card_position(card_id, position)
        })
        .await
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        target_list_id: &ListId,
        position: usize,
    ) -> Result<Card> {
        self.run("move_card", || {
            self.inner.move_card(card_id, target_list_id, position)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::memory::InMemoryGateway;
    use cardboard_common::List;

    fn board() -> BoardId {
        BoardId::from_string("b1")
    }

    async fn seeded() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        gateway
            .seed_list(List::new(board(), "To Do", 0))
            .await;
        gateway
    }

    #[tokio::test]
    async fn test_retries_network_errors() {
        let gateway = seeded().await;
        gateway
            .fail_next("get_lists", RemoteError::network("connection reset"))
            .await;
        gateway
            .fail_next("get_lists", RemoteError::network("connection reset"))
            .await;

        let retrying = RetryingGateway::with_policy(
            gateway,
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            },
        );

        let lists = retrying.get_lists(&board()).await.unwrap();
        assert_eq!(lists.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let gateway = seeded().await;
        for _ in 0..3 {
            gateway
                .fail_next("get_lists", RemoteError::network("down"))
                .await;
        }

        let retrying = RetryingGateway::with_policy(
            gateway,
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
            },
        );

        let result = retrying.get_lists(&board()).await;
        assert!(matches!(result, Err(RemoteError::Network { .. })));
    }

    #[tokio::test]
    async fn test_non_retryable_passes_through() {
        let gateway = seeded().await;
        gateway
            .fail_next("get_lists", RemoteError::unauthorized("no session"))
            .await;

        let retrying = RetryingGateway::new(gateway);
        let result = retrying.get_lists(&board()).await;
        assert!(matches!(result, Err(RemoteError::Unauthorized { .. })));

        // The failure was consumed; the next call succeeds without retry.
        let lists = retrying.get_lists(&board()).await.unwrap();
        assert_eq!(lists.len(), 1);
    }
}
