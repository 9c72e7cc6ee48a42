use std::fmt;

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use tracing::error;

/// DynamoDB error codes the store distinguishes when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConditionalCheckFailed,
    ProvisionedThroughputExceeded,
    ResourceNotFound,
    ItemCollectionSizeLimitExceeded,
    TransactionConflict,
    RequestLimitExceeded,
    InternalServerError,
    MalformedItem,
    Other,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ConditionalCheckFailed => "ConditionalCheckFailedException",
            ErrorKind::ProvisionedThroughputExceeded => "ProvisionedThroughputExceededException",
            ErrorKind::ResourceNotFound => "ResourceNotFoundException",
            ErrorKind::ItemCollectionSizeLimitExceeded => {
                "ItemCollectionSizeLimitExceededException"
            }
            ErrorKind::TransactionConflict => "TransactionConflictException",
            ErrorKind::RequestLimitExceeded => "RequestLimitExceeded",
            ErrorKind::InternalServerError => "InternalServerError",
            ErrorKind::MalformedItem => "MalformedItem",
            ErrorKind::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&GetItemError> for ErrorKind {
    fn from(err: &GetItemError) -> Self {
        match err {
            GetItemError::ProvisionedThroughputExceededException(_) => {
                ErrorKind::ProvisionedThroughputExceeded
            }
            GetItemError::ResourceNotFoundException(_) => ErrorKind::ResourceNotFound,
            GetItemError::RequestLimitExceeded(_) => ErrorKind::RequestLimitExceeded,
            GetItemError::InternalServerError(_) => ErrorKind::InternalServerError,
            _ => ErrorKind::Other,
        }
    }
}

impl From<&UpdateItemError> for ErrorKind {
    fn from(err: &UpdateItemError) -> Self {
        match err {
            UpdateItemError::ConditionalCheckFailedException(_) => {
                ErrorKind::ConditionalCheckFailed
            }
            UpdateItemError::ProvisionedThroughputExceededException(_) => {
                ErrorKind::ProvisionedThroughputExceeded
            }
            UpdateItemError::ResourceNotFoundException(_) => ErrorKind::ResourceNotFound,
            UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
                ErrorKind::ItemCollectionSizeLimitExceeded
            }
            UpdateItemError::TransactionConflictException(_) => ErrorKind::TransactionConflict,
            UpdateItemError::RequestLimitExceeded(_) => ErrorKind::RequestLimitExceeded,
            UpdateItemError::InternalServerError(_) => ErrorKind::InternalServerError,
            _ => ErrorKind::Other,
        }
    }
}

/// Failure of a store operation. SDK errors are kept as the source, untouched.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("GetItem request failed")]
    GetItem(#[from] Box<SdkError<GetItemError, HttpResponse>>),

    #[error("UpdateItem request failed")]
    UpdateItem(#[from] Box<SdkError<UpdateItemError, HttpResponse>>),

    #[error("conditional check failed for {email}")]
    ConditionalCheckFailed { email: String },

    #[error("malformed item: {0}")]
    MalformedItem(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::GetItem(err) => err
                .as_service_error()
                .map(ErrorKind::from)
                .unwrap_or(ErrorKind::Other),
            StoreError::UpdateItem(err) => err
                .as_service_error()
                .map(ErrorKind::from)
                .unwrap_or(ErrorKind::Other),
            StoreError::ConditionalCheckFailed { .. } => ErrorKind::ConditionalCheckFailed,
            StoreError::MalformedItem(_) => ErrorKind::MalformedItem,
        }
    }

    /// Logs the error with its code and full source chain, then hands it back.
    pub(crate) fn logged(self) -> Self {
        error!(code = %self.kind(), "{}", DisplayErrorContext(&self));
        self
    }
}
