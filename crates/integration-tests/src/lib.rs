//! Integration test support for the gallery storefront.
//!
//! Provides an in-process fixture backend that mimics the catalog and
//! checkout APIs the storefront talks to, bound to an ephemeral port so
//! tests run in parallel without external services.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test support code

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gallery_storefront::cart::Navigator;
use serde_json::{Value, json};

/// A running fixture backend.
pub struct FixtureBackend {
    /// Base URL to point `GalleryConfig` at.
    pub base_url: String,
    /// Bodies of every `create-session` request received, in order.
    pub checkout_requests: Arc<Mutex<Vec<Value>>>,
}

struct FixtureState {
    artworks: Vec<Value>,
    checkout_requests: Arc<Mutex<Vec<Value>>>,
    fail_checkout: bool,
}

/// The catalog the fixture serves, shaped exactly like the real backend's
/// records.
#[must_use]
pub fn sample_artworks() -> Vec<Value> {
    vec![
        json!({
            "id": "art-azure-dreams",
            "title": "Azure Dreams",
            "price": 850.00,
            "medium": "Acrylic on Canvas",
            "size": "24\" x 36\"",
            "year_created": 2024,
            "description": "Flowing blue and white elements.",
            "image_url": "https://images.example.com/azure-dreams",
            "category": "abstract",
            "availability": "available"
        }),
        json!({
            "id": "art-dynamic-blue",
            "title": "Dynamic Blue",
            "price": 720.00,
            "medium": "Oil on Canvas",
            "size": "20\" x 24\"",
            "year_created": 2024,
            "description": "Bold strokes creating movement and energy.",
            "image_url": "https://images.example.com/dynamic-blue",
            "category": "abstract",
            "availability": "available"
        }),
        json!({
            "id": "art-peaceful-valley",
            "title": "Peaceful Valley",
            "price": 1200.00,
            "medium": "Oil on Canvas",
            "size": "36\" x 48\"",
            "year_created": 2024,
            "description": "Rolling hills under an expansive sky.",
            "image_url": "https://images.example.com/peaceful-valley",
            "category": "landscape",
            "availability": "available"
        }),
        json!({
            "id": "art-sky-dreams",
            "title": "Sky Dreams",
            "price": 675.00,
            "medium": "Digital Art Print",
            "size": "18\" x 24\"",
            "year_created": 2023,
            "description": "Sky and clouds with modern composition.",
            "image_url": "https://images.example.com/sky-dreams",
            "category": "digital",
            "availability": "sold"
        }),
    ]
}

/// Spawn the fixture backend on an ephemeral port.
pub async fn spawn_backend() -> FixtureBackend {
    spawn(false).await
}

/// Spawn a backend whose session creation always answers 500.
pub async fn spawn_failing_backend() -> FixtureBackend {
    spawn(true).await
}

async fn spawn(fail_checkout: bool) -> FixtureBackend {
    let checkout_requests = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(FixtureState {
        artworks: sample_artworks(),
        checkout_requests: Arc::clone(&checkout_requests),
        fail_checkout,
    });

    let app = Router::new()
        .route("/api/artworks", get(list_artworks))
        .route("/api/artworks/{artwork_id}", get(get_artwork))
        .route("/api/featured-artworks", get(featured_artworks))
        .route("/api/checkout/create-session", post(create_session))
        .route("/api/checkout/session/{session_id}", get(session_status))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture backend");
    let addr = listener.local_addr().expect("fixture backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture backend");
    });

    FixtureBackend {
        base_url: format!("http://{addr}"),
        checkout_requests,
    }
}

fn field_matches(artwork: &Value, field: &str, expected: Option<&String>) -> bool {
    expected.is_none_or(|expected| artwork[field] == Value::String(expected.clone()))
}

async fn list_artworks(
    State(state): State<Arc<FixtureState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let listing: Vec<Value> = state
        .artworks
        .iter()
        .filter(|artwork| {
            field_matches(artwork, "category", params.get("category"))
                && field_matches(artwork, "availability", params.get("availability"))
        })
        .cloned()
        .collect();
    Json(Value::Array(listing))
}

async fn get_artwork(
    State(state): State<Arc<FixtureState>>,
    Path(artwork_id): Path<String>,
) -> Response {
    state
        .artworks
        .iter()
        .find(|artwork| artwork["id"] == Value::String(artwork_id.clone()))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Artwork not found"})),
                )
                    .into_response()
            },
            |artwork| Json(artwork.clone()).into_response(),
        )
}

async fn featured_artworks(State(state): State<Arc<FixtureState>>) -> Json<Value> {
    let featured: Vec<Value> = state
        .artworks
        .iter()
        .filter(|artwork| artwork["availability"] == "available")
        .take(3)
        .cloned()
        .collect();
    Json(Value::Array(featured))
}

async fn create_session(
    State(state): State<Arc<FixtureState>>,
    Json(body): Json<Value>,
) -> Response {
    state.checkout_requests.lock().unwrap().push(body);
    if state.fail_checkout {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Failed to create checkout session"})),
        )
            .into_response();
    }

    let attempt = state.checkout_requests.lock().unwrap().len();
    Json(json!({
        "session_id": format!("cs_test_{attempt}"),
        "session_url": format!("https://checkout.example.com/pay/cs_test_{attempt}"),
        "order_id": format!("ord_{attempt}"),
    }))
    .into_response()
}

async fn session_status(Path(session_id): Path<String>) -> Json<Value> {
    Json(json!({
        "session_id": session_id,
        "status": "complete",
        "payment_status": "paid",
    }))
}

/// Navigator that records redirects instead of leaving the page.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The redirects performed so far.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        self.redirects.lock().unwrap().push(url.to_string());
    }
}
