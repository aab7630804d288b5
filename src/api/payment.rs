use std::sync::Arc;

use poem::Request;
use poem_openapi::payload::Json;
use poem_openapi::{OpenApi, Tags};
use serde_json::Value;

use crate::coordinators::PaymentCoordinator;
use crate::errors::PaymentApiError;
use crate::types::dto::payment::CreateOrderRequest;
use crate::types::internal::context::RequestContext;

/// Payment order endpoint; only POST is routed, other methods answer 405
pub struct PaymentApi {
    payment_coordinator: Arc<PaymentCoordinator>,
}

impl PaymentApi {
    pub fn new(payment_coordinator: Arc<PaymentCoordinator>) -> Self {
        Self { payment_coordinator }
    }
}

#[derive(Tags)]
enum PaymentTags {
    /// Payment provider orders
    Payment,
}

#[OpenApi]
impl PaymentApi {
    /// Create a provider order and return it verbatim
    #[oai(path = "/payment", method = "post", tag = "PaymentTags::Payment")]
    async fn create_order(
        &self,
        req: &Request,
        body: Json<CreateOrderRequest>,
    ) -> Result<Json<Value>, PaymentApiError> {
        let ctx = RequestContext::for_api(req);
        let order = self.payment_coordinator.create_order(&ctx, body.0.into()).await?;

        Ok(Json(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_app_data;

    #[tokio::test]
    async fn test_unconfigured_payment_is_503() {
        let (app_data, _uploads) = setup_test_app_data(&[]).await;
        let api = PaymentApi::new(Arc::new(PaymentCoordinator::new(app_data)));

        let err = api
            .create_order(&Request::builder().finish(), Json(CreateOrderRequest::default()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 503);
    }
}
