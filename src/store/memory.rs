use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SubscriptionStore, UpdateOutcome, WriteGuard};
use crate::error::StoreError;
use crate::subscription::{Subscription, SubscriptionUpdate};

/// In-process subscription table with the same item semantics as DynamoDB:
/// an unconditional update creates the record when it is missing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<String, Subscription>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let items = subscriptions
            .into_iter()
            .map(|subscription| (subscription.email.clone(), subscription))
            .collect();

        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn get(&self, email: &str) -> Result<Option<Subscription>, StoreError> {
        Ok(self.items.read().await.get(email).cloned())
    }

    async fn update(
        &self,
        email: &str,
        update: &SubscriptionUpdate,
        guard: WriteGuard,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut items = self.items.write().await;

        if guard == WriteGuard::IdMatches {
            let id_matches = items
                .get(email)
                .is_some_and(|stored| stored.id == update.id);
            if !id_matches {
                return Err(StoreError::ConditionalCheckFailed {
                    email: email.to_string(),
                }
                .logged());
            }
        }

        let subscription = items
            .entry(email.to_string())
            .or_insert_with(|| Subscription {
                email: email.to_string(),
                id: String::new(),
                timestamp: String::new(),
                confirm: false,
            });
        update.apply_to(subscription);

        Ok(UpdateOutcome {
            subscription: Some(subscription.clone()),
        })
    }
}
