use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::PaymentKeys;
use crate::errors::InternalError;
use crate::errors::internal::{PaymentError, ValidationError};
use crate::providers::crypto_provider::CryptoProvider;
use crate::types::internal::context::RequestContext;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";
const DEFAULT_RECEIPT: &str = "receipt#1";

/// Caller-supplied order parameters; amount and currency are always the configured registration fee
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub receipt: Option<String>,
}

/// What the checkout widget hands back after a successful payment
#[derive(Debug, Clone)]
pub struct CheckoutProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Razorpay order creation and checkout signature verification
pub struct PaymentProvider {
    keys: Option<PaymentKeys>,
    crypto_provider: Arc<CryptoProvider>,
    client: reqwest::Client,
    registration_fee: u64,
    currency: String,
}

impl PaymentProvider {
    pub fn new(
        keys: Option<PaymentKeys>,
        crypto_provider: Arc<CryptoProvider>,
        registration_fee: u64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            crypto_provider,
            client: reqwest::Client::new(),
            registration_fee,
            currency: currency.into().trim().to_uppercase(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&PaymentKeys, InternalError> {
        self.keys.as_ref().ok_or_else(|| PaymentError::NotConfigured.into())
    }

    /// Provider request body for the registration fee, in the smallest currency unit
    pub fn order_body(&self, request: &OrderRequest) -> Result<Value, InternalError> {
        let amount_minor = self
            .registration_fee
            .checked_mul(100)
            .ok_or_else(|| ValidationError::invalid_field("REGISTRATION_FEE", "too large"))?;

        let receipt = request
            .receipt
            .as_deref()
            .filter(|receipt| !receipt.is_empty())
            .unwrap_or(DEFAULT_RECEIPT);

        Ok(json!({
            "amount": amount_minor,
            "currency": self.currency,
            "receipt": receipt,
        }))
    }

    /// Create an order and return the provider's order object verbatim
    ///
    /// # Errors
    /// * `PaymentError::NotConfigured` - no key pair
    /// * `PaymentError::Request` - transport failure or unreadable response
    /// * `PaymentError::Provider` - non-success status from the provider
    pub async fn create_order(&self, ctx: &RequestContext, request: &OrderRequest) -> Result<Value, InternalError> {
        let keys = self.keys()?;
        let body = self.order_body(request)?;

        let response = self
            .client
            .post(format!("{}/orders", RAZORPAY_API_BASE))
            .basic_auth(&keys.key_id, Some(&keys.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let order: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        tracing::info!(
            request_id = %ctx.request_id,
            order_id = order.get("id").and_then(serde_json::Value::as_str).unwrap_or("?"),
            amount = body["amount"].as_u64().unwrap_or_default(),
            "Created payment order"
        );

        Ok(order)
    }

    /// Expected checkout signature: hex HMAC-SHA256 of `order_id|payment_id` under the key secret
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> Result<String, InternalError> {
        let keys = self.keys()?;
        self.crypto_provider
            .hmac_sha256_hex(&keys.key_secret, &format!("{}|{}", order_id, payment_id))
    }

    /// # Errors
    /// * `PaymentError::NotConfigured` - no key pair
    /// * `PaymentError::InvalidSignature` - signature does not match
    pub fn verify_checkout(&self, proof: &CheckoutProof) -> Result<(), InternalError> {
        let expected = self.expected_signature(&proof.order_id, &proof.payment_id)?;
        let supplied = proof.signature.trim().to_lowercase();

        if self.crypto_provider.constant_time_eq(&expected, &supplied) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature {
                order_id: proof.order_id.clone(),
            }
            .into())
        }
    }
}
