use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::errors::ProxyError;
use crate::proxy::fanout::Fanout;
use crate::wire::{ErrorResponse, GetResponse, SetRequest};

pub type SharedFanout = Arc<Fanout>;

/// Builds the proxy's `/set`, `/get`, `/delete` router — same shape as the replica's.
pub fn router(fanout: SharedFanout) -> Router {
    Router::new()
        .route("/set", post(handle_set))
        .route("/get", get(handle_get))
        .route("/delete", delete(handle_delete))
        .with_state(fanout)
}

async fn handle_set(State(fanout): State<SharedFanout>, body: Bytes) -> Response {
    let req: SetRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "invalid request body"),
    };
    if req.key.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "key must not be empty");
    }

    match fanout.set(&req.key, &req.value).await {
        Ok(()) => {
            log::info!("proxy set {} ok", req.key);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            log::error!("proxy set {} failed: {err}", req.key);
            proxy_error_response(&err)
        }
    }
}

async fn handle_get(
    State(fanout): State<SharedFanout>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key").filter(|k| !k.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing key parameter");
    };

    match fanout.get(key).await {
        Ok(value) => {
            log::info!("proxy get {key} ok");
            Json(GetResponse { value }).into_response()
        }
        Err(err) => {
            log::warn!("proxy get {key} failed: {err}");
            proxy_error_response(&err)
        }
    }
}

async fn handle_delete(
    State(fanout): State<SharedFanout>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key").filter(|k| !k.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing key parameter");
    };

    match fanout.delete(key).await {
        Ok(()) => {
            log::info!("proxy delete {key} ok");
            StatusCode::OK.into_response()
        }
        Err(err) => {
            log::error!("proxy delete {key} failed: {err}");
            proxy_error_response(&err)
        }
    }
}

fn proxy_error_response(err: &ProxyError) -> Response {
    let status = match err {
        ProxyError::QuorumFailed => StatusCode::BAD_GATEWAY,
        ProxyError::NoReplicas => StatusCode::SERVICE_UNAVAILABLE,
        ProxyError::NotFound => StatusCode::NOT_FOUND,
        ProxyError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        ProxyError::Ring(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
