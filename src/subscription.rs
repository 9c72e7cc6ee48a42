use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const EMAIL: &str = "email";
pub const ID: &str = "id";
pub const TIMESTAMP: &str = "timestamp";
pub const CONFIRM: &str = "confirm";

/// A subscription record, keyed by `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub id: String,
    pub timestamp: String,
    pub confirm: bool,
}

/// The attributes an update overwrites. The key is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub id: String,
    pub timestamp: String,
    pub confirm: bool,
}

impl SubscriptionUpdate {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, confirm: bool) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            confirm,
        }
    }

    pub fn apply_to(&self, subscription: &mut Subscription) {
        subscription.id.clone_from(&self.id);
        subscription.timestamp.clone_from(&self.timestamp);
        subscription.confirm = self.confirm;
    }
}

impl TryFrom<&HashMap<String, AttributeValue>> for Subscription {
    type Error = StoreError;

    fn try_from(item: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let email = required_string(item, EMAIL)?;
        let id = required_string(item, ID)?;

        // Records are created elsewhere and may not carry these yet.
        let timestamp = match item.get(TIMESTAMP) {
            Some(AttributeValue::S(timestamp)) => timestamp.clone(),
            Some(_) => {
                return Err(StoreError::MalformedItem(format!(
                    "{TIMESTAMP} is not a string"
                )))
            }
            None => String::new(),
        };
        let confirm = match item.get(CONFIRM) {
            Some(AttributeValue::Bool(confirm)) => *confirm,
            Some(_) => {
                return Err(StoreError::MalformedItem(format!(
                    "{CONFIRM} is not a boolean"
                )))
            }
            None => false,
        };

        Ok(Self {
            email,
            id,
            timestamp,
            confirm,
        })
    }
}

fn required_string(
    item: &HashMap<String, AttributeValue>,
    attribute: &str,
) -> Result<String, StoreError> {
    match item.get(attribute) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        Some(_) => Err(StoreError::MalformedItem(format!(
            "{attribute} is not a string"
        ))),
        None => Err(StoreError::MalformedItem(format!("missing {attribute}"))),
    }
}
