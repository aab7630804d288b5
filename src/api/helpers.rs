use poem::Request;

use crate::api::auth::BearerAuth;
use crate::coordinators::LoginCoordinator;
use crate::errors::InternalError;
use crate::types::internal::context::RequestContext;

/// Request context carrying the bearer token's validated claims
pub fn authenticated_context(
    req: &Request,
    auth: &BearerAuth,
    login_coordinator: &LoginCoordinator,
) -> Result<RequestContext, InternalError> {
    login_coordinator.authenticate(RequestContext::for_api(req), &auth.0.token)
}
