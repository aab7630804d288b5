use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{OpenApi, Tags};

use crate::api::auth::BearerAuth;
use crate::api::helpers::authenticated_context;
use crate::coordinators::{DirectoryCoordinator, LoginCoordinator};
use crate::errors::DirectoryError;
use crate::types::dto::account::{
    AccountPayload, AccountResponse, account_response, AssignableRolesResponse, CreateAccountApiResponse,
    DeleteAccountApiResponse,
};
use crate::types::internal::context::RequestContext;

/// Role-scoped directory endpoints
pub struct UsersApi {
    directory_coordinator: Arc<DirectoryCoordinator>,
    login_coordinator: Arc<LoginCoordinator>,
}

impl UsersApi {
    pub fn new(directory_coordinator: Arc<DirectoryCoordinator>, login_coordinator: Arc<LoginCoordinator>) -> Self {
        Self {
            directory_coordinator,
            login_coordinator,
        }
    }

    fn context(&self, req: &Request, auth: &BearerAuth) -> Result<RequestContext, DirectoryError> {
        authenticated_context(req, auth, &self.login_coordinator).map_err(DirectoryError::from_internal_error)
    }
}

#[derive(Tags)]
enum UsersTags {
    /// Account management, scoped by the caller's role
    Users,
}

#[OpenApi]
impl UsersApi {
    /// Accounts visible to the caller
    #[oai(path = "/users", method = "get", tag = "UsersTags::Users")]
    async fn list(&self, req: &Request, auth: BearerAuth) -> Result<Json<Vec<AccountResponse>>, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        let accounts = self.directory_coordinator.list_accounts(&ctx).await?;

        Ok(Json(accounts.iter().map(account_response).collect()))
    }

    /// Create an account; JSON or multipart with an optional image
    #[oai(path = "/users", method = "post", tag = "UsersTags::Users")]
    async fn create(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: AccountPayload,
    ) -> Result<CreateAccountApiResponse, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        let (input, image) = body.into_parts().await?;

        let account = self.directory_coordinator.create_account(&ctx, input, image).await?;

        Ok(CreateAccountApiResponse::Created(Json(account_response(&account))))
    }

    /// One account by numeric id or username
    #[oai(path = "/users/:id", method = "get", tag = "UsersTags::Users")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<AccountResponse>, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        let account = self.directory_coordinator.get_account(&ctx, &id.0).await?;

        Ok(Json(account_response(&account)))
    }

    /// Partial update; absent fields keep their stored values
    #[oai(path = "/users/:id", method = "put", tag = "UsersTags::Users")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<i32>,
        body: AccountPayload,
    ) -> Result<Json<AccountResponse>, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        let (input, image) = body.into_parts().await?;

        let account = self.directory_coordinator.update_account(&ctx, id.0, input, image).await?;

        Ok(Json(account_response(&account)))
    }

    /// Delete an account and its image
    #[oai(path = "/users/:id", method = "delete", tag = "UsersTags::Users")]
    async fn delete(&self, req: &Request, auth: BearerAuth, id: Path<i32>) -> Result<DeleteAccountApiResponse, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        self.directory_coordinator.delete_account(&ctx, id.0).await?;

        Ok(DeleteAccountApiResponse::Deleted)
    }

    /// Roles the caller may assign, lowest rank first
    #[oai(path = "/roles/assignable", method = "get", tag = "UsersTags::Users")]
    async fn assignable_roles(&self, req: &Request, auth: BearerAuth) -> Result<Json<AssignableRolesResponse>, DirectoryError> {
        let ctx = self.context(req, &auth)?;
        let roles = self.directory_coordinator.assignable_roles(&ctx).await?;

        Ok(Json(AssignableRolesResponse { roles }))
    }
}
