use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::providers::payment_provider::{CheckoutProof, OrderRequest};

/// Request model for creating a payment order
///
/// The order is always for the configured registration fee and currency.
#[derive(Object, Debug, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub receipt: Option<String>,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(request: CreateOrderRequest) -> Self {
        OrderRequest {
            receipt: request.receipt,
        }
    }
}

/// Fields the Razorpay checkout widget returns after payment
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutProofRequest {
    #[oai(rename = "razorpay_order_id")]
    #[serde(rename = "razorpay_order_id")]
    pub order_id: String,

    #[oai(rename = "razorpay_payment_id")]
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,

    #[oai(rename = "razorpay_signature")]
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

impl From<CheckoutProofRequest> for CheckoutProof {
    fn from(request: CheckoutProofRequest) -> Self {
        CheckoutProof {
            order_id: request.order_id,
            payment_id: request.payment_id,
            signature: request.signature,
        }
    }
}
