//! HTTP surface
//!
//! A small JSON API over warp: health check, capsule creation and listing,
//! and an on-demand scheduler trigger that returns the same summary shape
//! as a timed pass. Validation failures answer with a specific message;
//! anything unexpected answers with a generic error and logged detail.

use crate::capsule::Capsule;
use crate::scheduler::DeliveryScheduler;
use crate::store::CapsuleStore;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Capsule creation request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCapsuleRequest {
    /// Sender display name
    #[serde(default)]
    pub sender_name: String,
    /// Recipient address
    #[serde(default)]
    pub receiver_email: String,
    /// Message body
    #[serde(default)]
    pub message: String,
    /// Unlock time, RFC 3339
    #[serde(default)]
    pub unlock_at: Option<String>,
    /// Optional classification tag
    #[serde(default)]
    pub category: Option<String>,
    /// Optional access password, digested before storage
    #[serde(default)]
    pub password: Option<String>,
}

/// Build the API routes
pub fn routes(
    store: Arc<dyn CapsuleStore>,
    scheduler: Arc<DeliveryScheduler>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let with_store = {
        let store = store.clone();
        warp::any().map(move || store.clone())
    };
    let with_scheduler = warp::any().map(move || scheduler.clone());

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})));

    let trigger = warp::path!("api" / "capsules" / "trigger-send")
        .and(warp::post())
        .and(with_scheduler)
        .and_then(trigger_send);

    let create = warp::path!("api" / "capsules")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store.clone())
        .and_then(create_capsule);

    let list = warp::path!("api" / "capsules")
        .and(warp::get())
        .and(with_store)
        .and_then(list_capsules);

    health
        .or(trigger)
        .or(create)
        .or(list)
        .recover(handle_rejection)
}

fn json_error(message: &str, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({"error": message})),
        status,
    )
}

async fn create_capsule(
    request: CreateCapsuleRequest,
    store: Arc<dyn CapsuleStore>,
) -> Result<impl Reply, Infallible> {
    let unlock_at = match request.unlock_at.as_deref() {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => {
                let parsed = parsed.with_timezone(&Utc);
                if parsed < Utc::now() {
                    return Ok(json_error(
                        "unlock date must not be in the past",
                        StatusCode::BAD_REQUEST,
                    ));
                }
                Some(parsed)
            }
            Err(_) => {
                return Ok(json_error("invalid unlock date", StatusCode::BAD_REQUEST));
            }
        },
        None => None,
    };

    let mut builder = Capsule::builder()
        .sender_name(request.sender_name)
        .receiver_email(request.receiver_email)
        .message(request.message);
    if let Some(unlock_at) = unlock_at {
        builder = builder.unlock_at(unlock_at);
    }
    if let Some(category) = request.category.filter(|c| !c.is_empty()) {
        builder = builder.category(category);
    }
    if let Some(password) = request.password {
        builder = builder.password(password);
    }

    let capsule = match builder.build() {
        Ok(capsule) => capsule,
        Err(e) => return Ok(json_error(&e.to_string(), StatusCode::BAD_REQUEST)),
    };

    match store.create(capsule).await {
        Ok(capsule) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({"message": "Saved", "capsule": capsule})),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("Capsule creation failed: {}", e);
            Ok(json_error("server error", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn list_capsules(store: Arc<dyn CapsuleStore>) -> Result<impl Reply, Infallible> {
    match store.list().await {
        Ok(capsules) => Ok(warp::reply::with_status(
            warp::reply::json(&capsules),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("Capsule listing failed: {}", e);
            Ok(json_error("server error", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn trigger_send(scheduler: Arc<DeliveryScheduler>) -> Result<impl Reply, Infallible> {
    match scheduler.run_once(Utc::now()).await {
        Ok(summary) => Ok(warp::reply::with_status(
            warp::reply::json(&summary),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("Triggered pass failed: {}", e);
            Ok(json_error("server error", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    if rejection.is_not_found() {
        return Ok(json_error("not found", StatusCode::NOT_FOUND));
    }
    if rejection
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        return Ok(json_error("invalid request body", StatusCode::BAD_REQUEST));
    }
    if rejection
        .find::<warp::reject::MethodNotAllowed>()
        .is_some()
    {
        return Ok(json_error(
            "method not allowed",
            StatusCode::METHOD_NOT_ALLOWED,
        ));
    }

    tracing::error!("Unhandled rejection: {:?}", rejection);
    Ok(json_error("server error", StatusCode::INTERNAL_SERVER_ERROR))
}
