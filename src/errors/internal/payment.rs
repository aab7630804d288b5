use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    /// Key id or key secret missing from the environment
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("Payment provider request failed: {0}")]
    Request(String),

    #[error("Payment provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// Registration is payment-gated and no checkout proof was supplied
    #[error("Payment required")]
    PaymentRequired,

    #[error("Payment signature mismatch for order {order_id}")]
    InvalidSignature { order_id: String },

    /// The order already paid for another registration
    #[error("Payment order {order_id} was already used")]
    AlreadyUsed { order_id: String },
}
