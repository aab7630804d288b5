use std::sync::Arc;

use serde_json::Value;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::providers::PaymentProvider;
use crate::providers::payment_provider::OrderRequest;
use crate::types::internal::context::RequestContext;

pub struct PaymentCoordinator {
    payment_provider: Arc<PaymentProvider>,
}

impl PaymentCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            payment_provider: app_data.providers.payment_provider.clone(),
        }
    }

    /// Create a provider order; the provider's order object is returned untouched
    ///
    /// # Errors
    /// * `PaymentError::NotConfigured` - no key pair in the environment
    /// * `ValidationError::InvalidField` - registration fee overflows the minor unit
    /// * `PaymentError::Request` / `PaymentError::Provider` - upstream failure
    pub async fn create_order(&self, ctx: &RequestContext, request: OrderRequest) -> Result<Value, InternalError> {
        match self.payment_provider.create_order(ctx, &request).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::error!(request_id = %ctx.request_id, error = %e, "Payment order failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::PaymentError;
    use crate::test::utils::setup_test_app_data;

    #[tokio::test]
    async fn test_unconfigured_payments() {
        let (app_data, _uploads) = setup_test_app_data(&[]).await;
        let coordinator = PaymentCoordinator::new(app_data);

        let result = coordinator
            .create_order(&RequestContext::for_system("test"), OrderRequest::default())
            .await;

        assert!(matches!(
            result,
            Err(InternalError::Payment(PaymentError::NotConfigured))
        ));
    }
}
