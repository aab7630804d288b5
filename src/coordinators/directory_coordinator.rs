use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::{AccountError, PolicyError};
use crate::policy::Scope;
use crate::policy::visibility::{check_assignment, check_group_scope, resolve_scope};
use crate::providers::AccountProvider;
use crate::types::internal::account::{Account, AccountInput, ImageUpload, Role};
use crate::types::internal::context::RequestContext;

/// Directory coordinator that applies the visibility policy to every read and write
///
/// Each call loads the full candidate set, resolves the caller's scope from
/// its stored record and only then touches the target. A target outside the
/// caller's visible set is reported as not found, never as forbidden.
pub struct DirectoryCoordinator {
    account_provider: Arc<AccountProvider>,
}

impl DirectoryCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            account_provider: app_data.providers.account_provider.clone(),
        }
    }

    async fn load_all(&self) -> Result<Vec<Account>, InternalError> {
        self.account_provider.list_all().await
    }

    /// The caller's own stored account
    ///
    /// # Errors
    /// * `PolicyError::ActorNotFound` - token subject has no stored account
    pub async fn whoami(&self, ctx: &RequestContext) -> Result<Account, InternalError> {
        let caller_id = ctx.caller_id()?;
        self.account_provider
            .get_by_id(caller_id)
            .await?
            .ok_or_else(|| PolicyError::ActorNotFound { actor_id: caller_id }.into())
    }

    /// Accounts visible to the caller, ordered by id
    pub async fn list_accounts(&self, ctx: &RequestContext) -> Result<Vec<Account>, InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;

        tracing::debug!(
            request_id = %ctx.request_id,
            actor = %ctx.actor_id,
            visible = scope.visible.len(),
            "Listed accounts"
        );

        Ok(scope.visible.into_iter().cloned().collect())
    }

    /// Roles the caller may set on a created or edited account
    pub async fn assignable_roles(&self, ctx: &RequestContext) -> Result<Vec<Role>, InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;
        Ok(scope.assignable.to_vec())
    }

    /// One account by numeric id or username: the caller's own or a visible one
    ///
    /// # Errors
    /// * `AccountError::NotFound` - absent, or present but outside the caller's visible set
    pub async fn get_account(&self, ctx: &RequestContext, key: &str) -> Result<Account, InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;

        let Some(target) = find_by_key(&all, key) else {
            return Err(AccountError::NotFound(key.to_string()).into());
        };

        if target.id == scope.actor.id || scope.can_view(target.id) {
            return Ok(target.clone());
        }

        deny_hidden(ctx, scope.actor.id, target.id, key)
    }

    /// Public ID-card view by exact username; needs no caller
    pub async fn public_profile(&self, ctx: &RequestContext, username: &str) -> Result<Account, InternalError> {
        let account = self
            .account_provider
            .get_by_username(username)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        tracing::debug!(request_id = %ctx.request_id, account_id = account.id, "Served public profile");
        Ok(account)
    }

    /// Create an account inside the caller's assignment scope
    ///
    /// # Errors
    /// * `PolicyError::NotStaff` - caller cannot create accounts at all
    /// * `ValidationError` - missing fields, bad extra fields or vocabulary
    /// * `PolicyError::RoleNotAssignable` / `PolicyError::OutOfScope` - record outside the caller's scope
    /// * `AccountError::DuplicateEmail` / `AccountError::DuplicateUsername`
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        input: AccountInput,
        image: Option<ImageUpload>,
    ) -> Result<Account, InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;

        if scope.assignable.is_empty() {
            return deny(ctx, PolicyError::NotStaff { role: scope.actor.role() });
        }

        let attributes = self.account_provider.prepare_new(&input).await?;

        if let Err(e) = check_assignment(scope.actor, attributes.role)
            .and_then(|_| check_group_scope(scope.actor, attributes.religion.as_deref(), attributes.cast.as_deref()))
        {
            return deny(ctx, e);
        }

        self.account_provider.create(ctx, attributes, image).await
    }

    /// Merge changes into a visible account
    ///
    /// # Errors
    /// * `AccountError::NotFound` - absent or not visible
    /// * `PolicyError::RoleNotAssignable` / `PolicyError::OutOfScope` - result would leave the caller's scope
    pub async fn update_account(
        &self,
        ctx: &RequestContext,
        id: i32,
        input: AccountInput,
        image: Option<ImageUpload>,
    ) -> Result<Account, InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;
        let existing = self.visible_target(ctx, &scope, &all, id)?;

        let attributes = self.account_provider.prepare_update(existing, &input).await?;

        if let Err(e) = check_assignment(scope.actor, attributes.role)
            .and_then(|_| check_group_scope(scope.actor, attributes.religion.as_deref(), attributes.cast.as_deref()))
        {
            return deny(ctx, e);
        }

        self.account_provider.update(ctx, existing, attributes, image).await
    }

    /// Delete a visible account and its image
    ///
    /// # Errors
    /// * `AccountError::NotFound` - absent, not visible, or already deleted
    pub async fn delete_account(&self, ctx: &RequestContext, id: i32) -> Result<(), InternalError> {
        let all = self.load_all().await?;
        let scope = resolve_scope(ctx.caller_id()?, &all)?;
        let target = self.visible_target(ctx, &scope, &all, id)?;

        self.account_provider.delete(ctx, target).await
    }

    fn visible_target<'a>(
        &self,
        ctx: &RequestContext,
        scope: &Scope<'_>,
        all: &'a [Account],
        id: i32,
    ) -> Result<&'a Account, InternalError> {
        let Some(target) = all.iter().find(|account| account.id == id) else {
            return Err(AccountError::NotFound(id.to_string()).into());
        };

        if !scope.can_view(target.id) {
            return deny_hidden(ctx, scope.actor.id, target.id, &id.to_string());
        }

        Ok(target)
    }
}

/// Numeric keys match ids first, then usernames
fn find_by_key<'a>(all: &'a [Account], key: &str) -> Option<&'a Account> {
    key.parse::<i32>()
        .ok()
        .and_then(|id| all.iter().find(|account| account.id == id))
        .or_else(|| all.iter().find(|account| account.username() == Some(key)))
}

fn deny<T>(ctx: &RequestContext, error: PolicyError) -> Result<T, InternalError> {
    tracing::warn!(
        request_id = %ctx.request_id,
        actor = %ctx.actor_id,
        reason = %error,
        "Policy denied directory operation"
    );
    Err(error.into())
}

fn deny_hidden<T>(ctx: &RequestContext, actor_id: i32, target_id: i32, key: &str) -> Result<T, InternalError> {
    let reason = PolicyError::NotVisible { actor_id, target_id };
    tracing::warn!(
        request_id = %ctx.request_id,
        actor = %ctx.actor_id,
        reason = %reason,
        "Policy denied directory operation"
    );
    Err(AccountError::NotFound(key.to_string()).into())
}
