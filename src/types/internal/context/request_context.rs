use std::net::IpAddr;

use poem::Request;

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::internal::auth::Claims;

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Carries what logging and policy checks need to know about the current
/// request across API, coordinator, provider and store layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Full JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,
}

impl RequestContext {
    /// Create a RequestContext for an HTTP request, before authentication
    pub fn for_api(req: &Request) -> Self {
        Self {
            ip_address: Self::extract_ip_address(req),
            request_id: RequestId::new(),
            claims: None,
            source: RequestSource::API,
            actor_id: "anonymous".to_owned(),
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            claims: None,
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
        }
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            claims: None,
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
        }
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // Check X-Forwarded-For header (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        // Check X-Real-IP header (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Set authentication state with claims; the actor becomes the token subject
    pub fn with_auth(mut self, claims: Claims) -> Self {
        self.actor_id = claims.sub.clone();
        self.claims = Some(claims);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    /// Account id of the authenticated caller
    ///
    /// # Errors
    /// * `CredentialError::MissingToken` - context carries no claims
    /// * `CredentialError::InvalidToken` - subject is not a numeric account id
    pub fn caller_id(&self) -> Result<i32, InternalError> {
        let claims = self
            .claims
            .as_ref()
            .ok_or(CredentialError::MissingToken)?;

        claims
            .account_id()
            .ok_or_else(|| CredentialError::invalid_token("jwt", "subject is not an account id").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::account::Role;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            role: Role::Admin,
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn test_forwarded_for_takes_precedence() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("X-Real-IP", "198.51.100.2")
            .finish();

        let ctx = RequestContext::for_api(&req);

        assert_eq!(ctx.ip_address, Some("203.0.113.7".parse().unwrap()));
        assert_eq!(ctx.source, RequestSource::API);
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_with_auth_sets_actor() {
        let ctx = RequestContext::for_system("test").with_auth(claims("42"));

        assert_eq!(ctx.actor_id, "42");
        assert_eq!(ctx.caller_id().unwrap(), 42);
    }

    #[test]
    fn test_caller_id_without_claims_fails() {
        let ctx = RequestContext::for_cli("bootstrap");

        assert!(matches!(
            ctx.caller_id(),
            Err(InternalError::Credential(CredentialError::MissingToken))
        ));
    }

    #[test]
    fn test_caller_id_with_non_numeric_subject_fails() {
        let ctx = RequestContext::for_cli("bootstrap").with_auth(claims("not-a-number"));

        assert!(matches!(
            ctx.caller_id(),
            Err(InternalError::Credential(CredentialError::InvalidToken { .. }))
        ));
    }
}
