// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream webhook ingress: idempotency mark → normalize → publish.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use super::AppState;

/// Delivery id header used for the 1-day idempotency mark.
const DELIVERY_HEADER: &str = "x-delivery-id";

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub published: usize,
    pub duplicate: bool,
}

/// `POST /webhook`
///
/// Always 200 once the payload is durably handled: recognized events are
/// published to the bus, unrecognized shapes are acked so the tracker
/// stops retrying them.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Some(delivery) = headers.get(DELIVERY_HEADER).and_then(|v| v.to_str().ok()) {
        if state.store().webhook_already_processed(delivery) {
            tracing::debug!(delivery, "duplicate webhook delivery");
            return Ok(Json(WebhookResponse { published: 0, duplicate: true }));
        }
    }

    let Some(events) = state.governor.adapter().normalize_webhook_event(&payload) else {
        tracing::debug!("unrecognized webhook shape");
        return Ok(Json(WebhookResponse { published: 0, duplicate: false }));
    };

    let mut published = 0;
    for event in events {
        match state.governor.bus().publish(event) {
            Ok(_) => published += 1,
            Err(err) => {
                tracing::warn!(error = %err, "webhook publish failed");
                return Err(ApiError::Internal("event bus unavailable".to_string()));
            }
        }
    }
    Ok(Json(WebhookResponse { published, duplicate: false }))
}
