use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::{SubscriptionStore, UpdateOutcome, WriteGuard};
use crate::subscription::{Subscription, SubscriptionUpdate};

/// Lookup and confirmation operations over a subscription store.
#[derive(Debug, Clone)]
pub struct Subscriptions<S> {
    store: S,
}

impl<S: SubscriptionStore> Subscriptions<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns whether a record exists for `email` whose stored `id` equals `id`.
    ///
    /// A missing record and an id mismatch both yield `Ok(false)`. A failed
    /// read is an `Err`, so callers can tell "absent" from "unknown".
    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, email: &str, id: &str) -> Result<bool, StoreError> {
        let Some(subscription) = self.store.get(email).await? else {
            return Ok(false);
        };

        if subscription.email == email && subscription.id == id {
            return Ok(true);
        }

        warn!("No match for email: {} with id: {}", email, id);
        Ok(false)
    }

    /// Overwrites `id`, `timestamp` and `confirm` on the record keyed by `email`.
    ///
    /// No authorization happens here and no condition is sent: concurrent
    /// writers to the same email race and the last one wins. Check the pair
    /// with [`Subscriptions::exists`] first, or use
    /// [`Subscriptions::update_if_id_matches`].
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        email: &str,
        id: &str,
        timestamp: &str,
        confirm: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let update = SubscriptionUpdate::new(id, timestamp, confirm);
        self.store
            .update(email, &update, WriteGuard::Unconditional)
            .await
    }

    /// Same as [`Subscriptions::update`], but the write only applies when the
    /// stored id already equals `id`. Fails with a conditional-check error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_if_id_matches(
        &self,
        email: &str,
        id: &str,
        timestamp: &str,
        confirm: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let update = SubscriptionUpdate::new(id, timestamp, confirm);
        self.store.update(email, &update, WriteGuard::IdMatches).await
    }

    /// Verifies the pair, then marks the subscription confirmed at the
    /// current time. Returns `None` without writing when the pair does not
    /// match a stored record.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(&self, email: &str, id: &str) -> Result<Option<Subscription>, StoreError> {
        if !self.exists(email, id).await? {
            return Ok(None);
        }

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let outcome = self.update(email, id, &timestamp, true).await?;
        info!("Confirmed subscription for {}", email);

        Ok(Some(outcome.subscription.unwrap_or_else(|| Subscription {
            email: email.to_string(),
            id: id.to_string(),
            timestamp,
            confirm: true,
        })))
    }
}
