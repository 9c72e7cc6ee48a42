use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::info;

use super::{SubscriptionStore, UpdateOutcome, WriteGuard};
use crate::config::Config;
use crate::error::StoreError;
use crate::subscription::{Subscription, SubscriptionUpdate, CONFIRM, EMAIL, ID, TIMESTAMP};

const UPDATE_EXPRESSION: &str = "SET #C = :confirmval, #T = :timeval, #ID = :idval";
const ID_MATCHES_CONDITION: &str = "#ID = :idval";

/// Subscription table backed by DynamoDB.
///
/// The client is built once and shared; `Client` is cheap to clone and safe
/// to use from concurrent invocations.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds a client from the default AWS credential chain.
    pub async fn from_config(config: &Config) -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        info!("Using table: {}", config.table_name);

        Self::new(Client::new(&aws_config), config.table_name.clone())
    }
}

#[async_trait]
impl SubscriptionStore for DynamoDbStore {
    async fn get(&self, email: &str) -> Result<Option<Subscription>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(EMAIL, AttributeValue::S(email.to_string()))
            .send()
            .await
            .map_err(|err| StoreError::from(Box::new(err)).logged())?;

        match result.item {
            Some(item) => Subscription::try_from(&item)
                .map(Some)
                .map_err(StoreError::logged),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        email: &str,
        update: &SubscriptionUpdate,
        guard: WriteGuard,
    ) -> Result<UpdateOutcome, StoreError> {
        // Keyed on email only: a second subscription request overrides the first id.
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(EMAIL, AttributeValue::S(email.to_string()))
            .expression_attribute_names("#ID", ID)
            .expression_attribute_names("#T", TIMESTAMP)
            .expression_attribute_names("#C", CONFIRM)
            .expression_attribute_values(":idval", AttributeValue::S(update.id.clone()))
            .expression_attribute_values(":timeval", AttributeValue::S(update.timestamp.clone()))
            .expression_attribute_values(":confirmval", AttributeValue::Bool(update.confirm))
            .update_expression(UPDATE_EXPRESSION)
            .return_values(ReturnValue::AllNew);

        if guard == WriteGuard::IdMatches {
            request = request.condition_expression(ID_MATCHES_CONDITION);
        }

        let output = request
            .send()
            .await
            .map_err(|err| StoreError::from(Box::new(err)).logged())?;

        let subscription = output
            .attributes
            .as_ref()
            .map(Subscription::try_from)
            .transpose()
            .map_err(StoreError::logged)?;

        Ok(UpdateOutcome { subscription })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
    use aws_sdk_dynamodb::operation::update_item::{
        UpdateItemError, UpdateItemInput, UpdateItemOutput,
    };
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ProvisionedThroughputExceededException,
    };
    use aws_smithy_mocks::{mock, mock_client};

    use super::*;
    use crate::error::ErrorKind;

    const TABLE: &str = "subscriptions";

    fn email_key(email: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(EMAIL.to_string(), AttributeValue::S(email.to_string()))])
    }

    fn item(
        email: &str,
        id: &str,
        timestamp: &str,
        confirm: bool,
    ) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (EMAIL.to_string(), AttributeValue::S(email.to_string())),
            (ID.to_string(), AttributeValue::S(id.to_string())),
            (TIMESTAMP.to_string(), AttributeValue::S(timestamp.to_string())),
            (CONFIRM.to_string(), AttributeValue::Bool(confirm)),
        ])
    }

    /// Matches the single UpdateItem request an update must produce.
    fn is_confirm_update(
        email: &str,
        id: &str,
        timestamp: &str,
        confirm: bool,
    ) -> impl Fn(&UpdateItemInput) -> bool + Send + Sync + 'static {
        let (email, id, timestamp) = (email.to_string(), id.to_string(), timestamp.to_string());
        move |req| {
            let names = HashMap::from([
                ("#ID".to_string(), ID.to_string()),
                ("#T".to_string(), TIMESTAMP.to_string()),
                ("#C".to_string(), CONFIRM.to_string()),
            ]);
            let values = HashMap::from([
                (":idval".to_string(), AttributeValue::S(id.clone())),
                (":timeval".to_string(), AttributeValue::S(timestamp.clone())),
                (":confirmval".to_string(), AttributeValue::Bool(confirm)),
            ]);

            req.table_name() == Some(TABLE)
                && req.key() == Some(&email_key(&email))
                && req.update_expression()
                    == Some("SET #C = :confirmval, #T = :timeval, #ID = :idval")
                && req.expression_attribute_names() == Some(&names)
                && req.expression_attribute_values() == Some(&values)
                && req.return_values() == Some(&ReturnValue::AllNew)
        }
    }

    #[tokio::test]
    async fn get_reads_by_email_key() {
        let rule = mock!(Client::get_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE) && req.key() == Some(&email_key("a@x.com"))
            })
            .then_output(|| {
                GetItemOutput::builder()
                    .set_item(Some(item("a@x.com", "123", "", false)))
                    .build()
            });
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        let subscription = store.get("a@x.com").await.unwrap().unwrap();

        assert_eq!(subscription.id, "123");
        assert!(!subscription.confirm);
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn get_without_item_is_none() {
        let rule = mock!(Client::get_item).then_output(|| GetItemOutput::builder().build());
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        assert_eq!(store.get("nobody@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn throttled_get_is_an_error() {
        let rule = mock!(Client::get_item).then_error(|| {
            GetItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("slow down")
                    .build(),
            )
        });
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        let err = store.get("a@x.com").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProvisionedThroughputExceeded);
    }

    #[tokio::test]
    async fn update_sets_fields_keyed_by_email_only() {
        let check = is_confirm_update("a@x.com", "123", "2020-01-01T00:00:00Z", true);
        let rule = mock!(Client::update_item)
            .match_requests(move |req| check(req) && req.condition_expression().is_none())
            .then_output(|| {
                UpdateItemOutput::builder()
                    .set_attributes(Some(item("a@x.com", "123", "2020-01-01T00:00:00Z", true)))
                    .build()
            });
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);
        let update = SubscriptionUpdate::new("123", "2020-01-01T00:00:00Z", true);

        let outcome = store
            .update("a@x.com", &update, WriteGuard::Unconditional)
            .await
            .unwrap();

        let subscription = outcome.subscription.unwrap();
        assert_eq!(subscription.email, "a@x.com");
        assert!(subscription.confirm);
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn update_with_email_shaped_id_keeps_the_key() {
        let check = is_confirm_update("a@x.com", "b@x.com", "2020-01-01T00:00:00Z", false);
        let rule = mock!(Client::update_item)
            .match_requests(check)
            .then_output(|| UpdateItemOutput::builder().build());
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);
        let update = SubscriptionUpdate::new("b@x.com", "2020-01-01T00:00:00Z", false);

        let outcome = store
            .update("a@x.com", &update, WriteGuard::Unconditional)
            .await
            .unwrap();

        assert_eq!(outcome.subscription, None);
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn guarded_update_sends_id_condition() {
        let check = is_confirm_update("a@x.com", "123", "2020-01-01T00:00:00Z", true);
        let rule = mock!(Client::update_item)
            .match_requests(move |req| {
                check(req) && req.condition_expression() == Some("#ID = :idval")
            })
            .then_output(|| UpdateItemOutput::builder().build());
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);
        let update = SubscriptionUpdate::new("123", "2020-01-01T00:00:00Z", true);

        store
            .update("a@x.com", &update, WriteGuard::IdMatches)
            .await
            .unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn failed_condition_is_classified() {
        let rule = mock!(Client::update_item).then_error(|| {
            UpdateItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            )
        });
        let store = DynamoDbStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);
        let update = SubscriptionUpdate::new("999", "2020-01-01T00:00:00Z", true);

        let err = store
            .update("a@x.com", &update, WriteGuard::IdMatches)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConditionalCheckFailed);
        assert!(matches!(err, StoreError::UpdateItem(_)));
    }
}
