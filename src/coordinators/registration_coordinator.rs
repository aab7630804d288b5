use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::PaymentError;
use crate::providers::payment_provider::CheckoutProof;
use crate::providers::{AccountProvider, PaymentProvider};
use crate::types::internal::account::{Account, AccountInput, ImageUpload, Role};
use crate::types::internal::context::RequestContext;

/// Self-service sign-up; always yields a plain `user` account
pub struct RegistrationCoordinator {
    account_provider: Arc<AccountProvider>,
    payment_provider: Arc<PaymentProvider>,
    requires_payment: bool,
}

impl RegistrationCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            account_provider: app_data.providers.account_provider.clone(),
            payment_provider: app_data.providers.payment_provider.clone(),
            requires_payment: app_data.settings.registration_requires_payment(),
        }
    }

    /// Register a new account, checking the checkout proof first when sign-up is paid
    ///
    /// Whatever role the input carries is replaced with `user`. A paid account
    /// records its order id; the same order cannot register a second account.
    ///
    /// # Errors
    /// * `PaymentError::PaymentRequired` - paid sign-up and no proof supplied
    /// * `PaymentError::InvalidSignature` - proof does not verify
    /// * `PaymentError::AlreadyUsed` - the order already paid for another account
    /// * `ValidationError` / `AccountError` - same rules as an admin-created account
    pub async fn register(
        &self,
        ctx: &RequestContext,
        mut input: AccountInput,
        proof: Option<CheckoutProof>,
        image: Option<ImageUpload>,
    ) -> Result<Account, InternalError> {
        let paid_order = if self.requires_payment {
            let Some(proof) = proof else {
                tracing::warn!(request_id = %ctx.request_id, "Registration without payment proof");
                return Err(PaymentError::PaymentRequired.into());
            };
            self.payment_provider.verify_checkout(&proof)?;
            tracing::info!(
                request_id = %ctx.request_id,
                order_id = %proof.order_id,
                payment_id = %proof.payment_id,
                "Registration payment verified"
            );
            Some(proof.order_id)
        } else {
            None
        };

        input.role = Some(Role::User);
        let mut attributes = self.account_provider.prepare_new(&input).await?;
        attributes.payment_order_id = paid_order;
        self.account_provider.create(ctx, attributes, image).await
    }
}
