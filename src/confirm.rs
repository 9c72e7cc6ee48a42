use lambda_http::http::StatusCode;
use lambda_http::{
    run, service_fn, Error as LambdaError, Request as LambdaRequest, RequestExt,
    Response as LambdaResponse,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use subscription_confirm::{Config, DynamoDbStore, Subscription, SubscriptionStore, Subscriptions};

mod common;
use crate::common::errors::Error;
use crate::common::utils::{extract_request, json_response, text_response};

const MISSING_PARAMETERS_ERROR: &str = "Both email and id are required";
const NO_MATCHING_SUBSCRIPTION_ERROR: &str = "No matching subscription";

#[derive(Debug, Deserialize)]
struct Request {
    pub email: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
struct Response {
    pub subscription: Subscription,
}

/// Reads `email` and `id` from the query string, falling back to a JSON body.
fn confirmation_request(request: &LambdaRequest) -> Result<Request, Error> {
    let params = request.query_string_parameters();
    let request = match (params.first("email"), params.first("id")) {
        (Some(email), Some(id)) => Request {
            email: email.into(),
            id: id.into(),
        },
        _ => extract_request::<Request>(request)?,
    };

    if request.email.trim().is_empty() || request.id.trim().is_empty() {
        return Err(Error::HttpError(text_response(
            StatusCode::BAD_REQUEST,
            MISSING_PARAMETERS_ERROR,
        )?));
    }

    Ok(request)
}

#[tracing::instrument(skip(subscriptions))]
async fn process_request<S: SubscriptionStore>(
    request: LambdaRequest,
    subscriptions: &Subscriptions<S>,
) -> Result<LambdaResponse<String>, Error> {
    let request = confirmation_request(&request)?;

    info!("Confirming subscription for {}", request.email);
    let Some(subscription) = subscriptions.confirm(&request.email, &request.id).await? else {
        info!("No subscription matches the request");
        return Err(Error::HttpError(text_response(
            StatusCode::NOT_FOUND,
            NO_MATCHING_SUBSCRIPTION_ERROR,
        )?));
    };

    json_response(StatusCode::OK, &Response { subscription })
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();

    let config = Config::from_env();
    let subscriptions = Subscriptions::new(DynamoDbStore::from_config(&config).await);

    run(service_fn(|request: LambdaRequest| async {
        let result = process_request(request, &subscriptions).await;

        match result {
            Ok(val) => Ok(val),
            Err(Error::HttpError(val)) => Ok(val),
            Err(Error::LambdaError(err)) => Err(err),
        }
    }))
    .await
}
