use super::AppState;
use super::error::ApiError;
use crate::config::SIGNATURE_HEADER;
use crate::domain::subscriber::SubscriberClass;
use crate::error::RelayError;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

/// Returns the cached balance as plain text.
pub async fn account_balance(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.store.get_balance().await?)
}

/// Authenticates a banking API webhook call and queues it for processing.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    state.intake.accept(body, signature).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterParams {
    class: Option<String>,
}

/// Adds the URI in the request body to a subscriber list.
pub async fn register(
    State(state): State<AppState>,
    Query(params): Query<RegisterParams>,
    body: String,
) -> Result<StatusCode, ApiError> {
    let class = match params.class.as_deref() {
        None => SubscriberClass::Formatted,
        Some(name) => SubscriberClass::parse(name).ok_or_else(|| {
            RelayError::DecodeError(format!("unknown subscriber class '{}'", name))
        })?,
    };

    let uri = body.trim();
    if uri.is_empty() {
        return Err(RelayError::DecodeError("empty subscriber uri".to_string()).into());
    }

    state.store.add_subscriber_uri(class, uri).await?;
    tracing::info!(%class, uri, "registered subscriber");
    Ok(StatusCode::CREATED)
}

/// Runs the transaction pipeline for one pushed queue message.
pub async fn process(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    state.pipeline.process(&body).await?;
    Ok(StatusCode::OK)
}
