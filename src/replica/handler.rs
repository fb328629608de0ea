use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::errors::StoreError;
use crate::store::Store;
use crate::wire::{ErrorResponse, GetResponse, SetRequest};

pub type SharedStore = Arc<Store>;

/// Builds the `/set`, `/get`, `/delete` router. Wrong methods on a matched path produce axum's
/// default `405` automatically.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/set", post(handle_set))
        .route("/get", get(handle_get))
        .route("/delete", delete(handle_delete))
        .with_state(store)
}

async fn handle_set(State(store): State<SharedStore>, body: Bytes) -> Response {
    let req: SetRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "invalid request body"),
    };
    if req.key.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "key must not be empty");
    }

    let key = req.key.clone();
    let result = tokio::task::spawn_blocking(move || store.set(&req.key, &req.value))
        .await
        .expect("store task panicked");
    match result {
        Ok(()) => {
            log::info!("set {key} ok");
            StatusCode::OK.into_response()
        }
        Err(err) => {
            log::error!("set {key} failed: {err}");
            store_error_response(&err)
        }
    }
}

async fn handle_get(
    State(store): State<SharedStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key").filter(|k| !k.is_empty()).cloned() else {
        return error_response(StatusCode::BAD_REQUEST, "missing key parameter");
    };

    let result = tokio::task::spawn_blocking({
        let key = key.clone();
        move || store.get(&key)
    })
    .await
    .expect("store task panicked");
    match result {
        Ok(value) => {
            log::info!("get {key} ok");
            Json(GetResponse { value }).into_response()
        }
        Err(err) => {
            log::warn!("get {key} failed: {err}");
            store_error_response(&err)
        }
    }
}

async fn handle_delete(
    State(store): State<SharedStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key").filter(|k| !k.is_empty()).cloned() else {
        return error_response(StatusCode::BAD_REQUEST, "missing key parameter");
    };

    let result = tokio::task::spawn_blocking({
        let key = key.clone();
        move || store.delete(&key)
    })
    .await
    .expect("store task panicked");
    match result {
        Ok(()) => {
            log::info!("delete {key} ok");
            StatusCode::OK.into_response()
        }
        Err(err) => {
            log::error!("delete {key} failed: {err}");
            store_error_response(&err)
        }
    }
}

fn store_error_response(err: &StoreError) -> Response {
    let status = match err {
        StoreError::KeyNotFound => StatusCode::NOT_FOUND,
        StoreError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) | StoreError::Json(_) | StoreError::CorruptLog(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        StoreError::AlreadyRecovered => StatusCode::INTERNAL_SERVER_ERROR,
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
