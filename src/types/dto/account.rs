use std::collections::BTreeMap;

use poem_openapi::payload::Json;
use poem_openapi::types::multipart::{JsonField, Upload};
use poem_openapi::{ApiRequest, ApiResponse, Multipart, Object};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::InternalError;
use crate::errors::internal::UploadError;
use crate::policy::ExtraField;
use crate::types::dto::payment::CheckoutProofRequest;
use crate::types::internal::account::{Account, AccountInput, ImageUpload, Role};

/// One caller-defined field
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct ExtraFieldRequest {
    /// Stored lower-cased; may not collide with a built-in field
    pub label: String,

    /// Non-empty string or number
    pub value: Value,
}

/// Account fields for create, edit and registration
///
/// On edit every field is optional and absent fields keep their stored value.
#[derive(Object, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,

    /// Plaintext; required on create, re-hashed on edit only when non-empty
    pub password: Option<String>,

    pub religion: Option<String>,
    pub cast: Option<String>,

    #[oai(default)]
    #[serde(default)]
    pub extra_fields: Vec<ExtraFieldRequest>,
}

impl From<AccountRequest> for AccountInput {
    fn from(request: AccountRequest) -> Self {
        AccountInput {
            first_name: request.first_name,
            last_name: request.last_name,
            username: request.username,
            email: request.email,
            role: request.role,
            password: request.password,
            religion: request.religion,
            cast: request.cast,
            extra_fields: request
                .extra_fields
                .into_iter()
                .map(|field| ExtraField::new(field.label, field.value))
                .collect(),
        }
    }
}

/// Multipart form: `account` JSON part plus an optional `image` file part
#[derive(Multipart)]
pub struct AccountForm {
    pub account: JsonField<AccountRequest>,
    pub image: Option<Upload>,
}

/// Account body as JSON or multipart
#[derive(ApiRequest)]
pub enum AccountPayload {
    Json(Json<AccountRequest>),
    Multipart(AccountForm),
}

impl AccountPayload {
    /// Split into the account fields and the image bytes, if any
    pub async fn into_parts(self) -> Result<(AccountInput, Option<ImageUpload>), InternalError> {
        match self {
            AccountPayload::Json(Json(request)) => Ok((request.into(), None)),
            AccountPayload::Multipart(form) => {
                let image = read_image(form.image).await?;
                Ok((form.account.0.into(), image))
            }
        }
    }
}

/// Self-service registration body
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub account: AccountRequest,

    /// Required when registration is payment-gated
    pub payment: Option<CheckoutProofRequest>,
}

#[derive(Multipart)]
pub struct RegisterForm {
    pub account: JsonField<AccountRequest>,
    pub payment: Option<JsonField<CheckoutProofRequest>>,
    pub image: Option<Upload>,
}

#[derive(ApiRequest)]
pub enum RegisterPayload {
    Json(Json<RegisterRequest>),
    Multipart(RegisterForm),
}

impl RegisterPayload {
    pub async fn into_parts(
        self,
    ) -> Result<(AccountInput, Option<CheckoutProofRequest>, Option<ImageUpload>), InternalError> {
        match self {
            RegisterPayload::Json(Json(request)) => Ok((request.account.into(), request.payment, None)),
            RegisterPayload::Multipart(form) => {
                let image = read_image(form.image).await?;
                Ok((form.account.0.into(), form.payment.map(|field| field.0), image))
            }
        }
    }
}

/// Browsers send an empty file part when no file was chosen; that counts as no image
async fn read_image(upload: Option<Upload>) -> Result<Option<ImageUpload>, InternalError> {
    let Some(upload) = upload else {
        return Ok(None);
    };

    let file_name = upload.file_name().map(str::to_string);
    let bytes = upload
        .into_vec()
        .await
        .map_err(|e| UploadError::Rejected(format!("unreadable image part: {}", e)))?;

    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageUpload { file_name, bytes }))
}

/// Account as clients see it: `id`, every stored attribute spread flat, and
/// `created_at` (RFC 3339). Extra fields sit at the top level next to the known keys.
pub type AccountResponse = BTreeMap<String, Value>;

/// Stored keys that never leave the server
const PRIVATE_KEYS: [&str; 2] = ["password", "payment_order_id"];

pub fn account_response(account: &Account) -> AccountResponse {
    let mut response: AccountResponse = account
        .attributes
        .to_map()
        .into_iter()
        .filter(|(key, _)| !PRIVATE_KEYS.contains(&key.as_str()))
        .collect();

    response.insert("id".to_string(), Value::from(account.id));
    response.insert("created_at".to_string(), Value::String(account.created_at_rfc3339()));
    response
}

/// API response for account creation
#[derive(ApiResponse, Debug)]
pub enum CreateAccountApiResponse {
    /// Account created
    #[oai(status = 201)]
    Created(Json<AccountResponse>),
}

/// API response for account deletion
#[derive(ApiResponse, Debug)]
pub enum DeleteAccountApiResponse {
    /// Row and image removed
    #[oai(status = 204)]
    Deleted,
}

/// One religion with its casts, in display order
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub religion: String,
    pub casts: Vec<String>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AssignableRolesResponse {
    /// Lowest rank first
    pub roles: Vec<Role>,
}
