//! Checkout session creation against the payment backend.
//!
//! The backend wraps the payment processor: it takes the cart snapshot,
//! creates a hosted checkout session, and returns the URL the browser must
//! be redirected to. [`CheckoutGateway`] is the seam the cart controller
//! drives; [`CheckoutClient`] is the HTTP implementation.

use gallery_core::{ArtworkId, CheckoutSessionId, Email, OrderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::GalleryConfig;

/// Errors that can occur when creating or inspecting a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("Checkout error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One (artwork, quantity) tuple of a cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub artwork_id: ArtworkId,
    pub quantity: u32,
}

/// Session-creation request: the cart snapshot plus the customer contact.
///
/// The `idempotency_key` is generated fresh per checkout attempt so the
/// backend can deduplicate a client retry after a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLineItem>,
    pub customer_email: Option<Email>,
    pub idempotency_key: Uuid,
}

/// A created checkout session: where to send the browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub session_id: CheckoutSessionId,
    /// Absolute URL of the processor's hosted checkout page.
    pub session_url: String,
    /// Backend-side order created alongside the session, when reported.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// Payment state of a session, as reported by the backend after return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStatus {
    pub session_id: CheckoutSessionId,
    pub status: String,
    pub payment_status: String,
}

impl SessionStatus {
    /// Whether the processor reports the session as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Seam for issuing session-creation requests.
///
/// The controller is generic over this trait so tests can run the full
/// checkout flow without a network.
// Futures need not be Send: the storefront runs on a single-threaded,
// event-driven shell.
#[allow(async_fn_in_trait)]
pub trait CheckoutGateway {
    /// Create a checkout session for a cart snapshot.
    ///
    /// # Errors
    ///
    /// Any non-2xx response or transport failure is a checkout failure.
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}

/// HTTP client for the checkout backend.
#[derive(Clone)]
pub struct CheckoutClient {
    client: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
}

impl CheckoutClient {
    /// Create a new checkout client.
    #[must_use]
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.checkout_url.clone(),
            timeout: config.http_timeout,
        }
    }

    /// Look up the payment state of a previously created session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn session_status(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<SessionStatus, CheckoutError> {
        let url = format!("{}/api/checkout/session/{session_id}", self.base_url);

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CheckoutError::Parse(e.to_string()))
    }
}

impl CheckoutGateway for CheckoutClient {
    #[instrument(skip(self, request), fields(idempotency_key = %request.idempotency_key))]
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let url = format!("{}/api/checkout/create-session", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CheckoutError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = CheckoutRequest {
            items: vec![CheckoutLineItem {
                artwork_id: ArtworkId::new("a-1"),
                quantity: 2,
            }],
            customer_email: Some(Email::parse("collector@example.com").unwrap()),
            idempotency_key: Uuid::nil(),
        };

        let body: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(body["items"][0]["artwork_id"], "a-1");
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["customer_email"], "collector@example.com");
        assert_eq!(
            body["idempotency_key"],
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_session_response_shape() {
        let json = r#"{
            "session_id": "cs_test_123",
            "session_url": "https://checkout.example.com/pay/cs_test_123",
            "order_id": "ord-9"
        }"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.session_id, CheckoutSessionId::new("cs_test_123"));
        assert_eq!(session.order_id, Some(OrderId::new("ord-9")));

        // order_id is optional
        let json = r#"{"session_id": "cs_1", "session_url": "https://x.example/1"}"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.order_id, None);
    }

    #[test]
    fn test_session_status_paid() {
        let json = r#"{"session_id": "cs_1", "status": "complete", "payment_status": "paid"}"#;
        let status: SessionStatus = serde_json::from_str(json).unwrap();
        assert!(status.is_paid());

        let json = r#"{"session_id": "cs_1", "status": "open", "payment_status": "unpaid"}"#;
        let status: SessionStatus = serde_json::from_str(json).unwrap();
        assert!(!status.is_paid());
    }
}
