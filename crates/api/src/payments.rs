//! Payment gateway port and HTTP adapter.
//!
//! The gateway is an opaque external collaborator: it takes an amount, a
//! payer, and an idempotency key, and answers succeeded / requires_action /
//! failed. The engine never calls it twice for an already-finalized booking;
//! retried attempts for the same logical booking reuse the same key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome status reported by the gateway for a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Succeeded,
    RequiresAction,
    Failed,
}

/// A completed gateway call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeOutcome {
    pub status: ChargeStatus,
    /// Gateway-side charge identifier.
    pub id: String,
}

/// Transport or protocol failure talking to the gateway.
///
/// Distinct from a *declined* charge, which is a normal [`ChargeOutcome`]
/// with [`ChargeStatus::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("gateway returned an unexpected response: {0}")]
    Protocol(String),
}

/// Port for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge the payer, keyed by the caller's idempotency key.
    async fn charge(
        &self,
        amount_cents: i64,
        payer_email: &str,
        idempotency_key: &str,
    ) -> Result<ChargeOutcome, GatewayError>;
}

// ---------------------------------------------------------------------------
// HTTP adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    amount_cents: i64,
    payer_email: &'a str,
}

/// Gateway adapter speaking JSON over HTTP.
///
/// Sends `POST {base_url}/charges` with the idempotency key in the
/// `Idempotency-Key` header, the convention payment providers use for
/// at-most-once charge semantics.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        payer_email: &str,
        idempotency_key: &str,
    ) -> Result<ChargeOutcome, GatewayError> {
        let url = format!("{}/charges", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Idempotency-Key", idempotency_key)
            .json(&ChargeRequest {
                amount_cents,
                payer_email,
            })
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Protocol(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        response
            .json::<ChargeOutcome>()
            .await
            .map_err(|err| GatewayError::Protocol(err.to_string()))
    }
}
