mod dynamodb;
mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::subscription::{Subscription, SubscriptionUpdate};

pub use dynamodb::DynamoDbStore;
pub use memory::InMemoryStore;

/// Precondition attached to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteGuard {
    /// Overwrite whatever is stored; the last writer wins.
    #[default]
    Unconditional,
    /// Only write when the stored id equals the id being written.
    IdMatches,
}

/// Result of an update. `subscription` is the record as stored after the
/// write, when the backend returned it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub subscription: Option<Subscription>,
}

/// Item-level access to the subscription table.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Point read keyed by `email`.
    async fn get(&self, email: &str) -> Result<Option<Subscription>, StoreError>;

    /// Overwrites `id`, `timestamp` and `confirm` on the record keyed by `email`.
    async fn update(
        &self,
        email: &str,
        update: &SubscriptionUpdate,
        guard: WriteGuard,
    ) -> Result<UpdateOutcome, StoreError>;
}
