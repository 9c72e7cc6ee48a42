//! Subscription confirmation on top of a DynamoDB table.
//!
//! A subscription record is keyed by `email` and carries a secondary `id`,
//! a `timestamp` and a `confirm` flag. [`Subscriptions`] looks a record up
//! and verifies the id, and overwrites the mutable fields once the caller
//! has done so.

pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod subscription;

pub use config::Config;
pub use error::{ErrorKind, StoreError};
pub use service::Subscriptions;
pub use store::{DynamoDbStore, InMemoryStore, SubscriptionStore, UpdateOutcome, WriteGuard};
pub use subscription::{Subscription, SubscriptionUpdate};
