use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::internal::ValidationError;
use crate::policy::ExtraField;

/// Attribute keys with a fixed meaning. Every other key is a caller-defined extra field.
pub const RESERVED_KEYS: [&str; 12] = [
    "first_name",
    "last_name",
    "username",
    "email",
    "role",
    "password",
    "id",
    "religion",
    "cast",
    "created_at",
    "image",
    "payment_order_id",
];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Staff rank. Declaration order is the rank order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    poem_openapi::Enum,
)]
#[serde(rename_all = "kebab-case")]
#[oai(rename_all = "kebab-case")]
pub enum Role {
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Moderator, Role::Admin, Role::SuperAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    /// Parse the stored form; anything outside the four known values is rejected
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of the `user_info` blob
///
/// Known attributes are typed fields; everything else is kept verbatim in
/// `extra_fields` and written back flat next to the known keys.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountAttributes {
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    /// Argon2 PHC string, never plaintext
    pub password_hash: Option<String>,
    pub religion: Option<String>,
    pub cast: Option<String>,
    /// Public path of the uploaded profile image
    pub image: Option<String>,
    /// Checkout order that paid for a self-registration; one account per order
    pub payment_order_id: Option<String>,
    pub extra_fields: BTreeMap<String, Value>,
}

impl AccountAttributes {
    /// Decode a flat attribute map
    ///
    /// `id` and `created_at` are ignored if present; they live in their own columns.
    ///
    /// # Errors
    /// * `ValidationError::MissingField` - `first_name`, `email` or `role` absent or empty
    /// * `ValidationError::InvalidField` - a known key holds a non-string value or an unknown role
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self, ValidationError> {
        map.remove("id");
        map.remove("created_at");

        let first_name = take_required(&mut map, "first_name")?;
        let email = take_required(&mut map, "email")?;
        let role_value = take_required(&mut map, "role")?;
        let role = Role::parse(&role_value)
            .ok_or_else(|| ValidationError::invalid_field("role", format!("unknown role '{}'", role_value)))?;

        let last_name = take_optional(&mut map, "last_name")?;
        let username = take_optional(&mut map, "username")?;
        let password_hash = take_optional(&mut map, "password")?;
        let religion = take_optional(&mut map, "religion")?;
        let cast = take_optional(&mut map, "cast")?;
        let image = take_optional(&mut map, "image")?;
        let payment_order_id = take_optional(&mut map, "payment_order_id")?;

        Ok(Self {
            first_name,
            last_name,
            username,
            email,
            role,
            password_hash,
            religion,
            cast,
            image,
            payment_order_id,
            extra_fields: map.into_iter().collect(),
        })
    }

    /// Encode back to the flat blob layout
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        for (key, value) in &self.extra_fields {
            map.insert(key.clone(), value.clone());
        }

        map.insert("first_name".into(), Value::String(self.first_name.clone()));
        map.insert("email".into(), Value::String(self.email.clone()));
        map.insert("role".into(), Value::String(self.role.as_str().to_string()));

        let optional = [
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("password", &self.password_hash),
            ("religion", &self.religion),
            ("cast", &self.cast),
            ("image", &self.image),
            ("payment_order_id", &self.payment_order_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.into(), Value::String(value.clone()));
            }
        }

        map
    }
}

fn take_optional(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::invalid_field(
            key,
            format!("expected a string, got {}", other),
        )),
    }
}

fn take_required(map: &mut Map<String, Value>, key: &str) -> Result<String, ValidationError> {
    take_optional(map, key)?.ok_or_else(|| ValidationError::MissingField(key.to_string()))
}

/// A stored account: the row identity plus its decoded attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i32,
    pub attributes: AccountAttributes,
    pub created_at: i64,
}

impl Account {
    pub fn role(&self) -> Role {
        self.attributes.role
    }

    pub fn religion(&self) -> Option<&str> {
        self.attributes.religion.as_deref()
    }

    pub fn cast(&self) -> Option<&str> {
        self.attributes.cast.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.attributes.username.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.attributes.email
    }

    pub fn image(&self) -> Option<&str> {
        self.attributes.image.as_deref()
    }

    pub fn created_at_rfc3339(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.created_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default()
    }
}

/// Caller-supplied account fields for create and edit
///
/// `None` leaves a field untouched on edit; an empty string clears an optional one.
#[derive(Debug, Clone, Default)]
pub struct AccountInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Plaintext, hashed before it reaches the store
    pub password: Option<String>,
    pub religion: Option<String>,
    pub cast: Option<String>,
    pub extra_fields: Vec<ExtraField>,
}

impl AccountInput {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.password.as_deref().is_none_or(str::is_empty)
            && self.religion.is_none()
            && self.cast.is_none()
            && self.extra_fields.is_empty()
    }

    /// Known fields as a flat map, password excluded
    pub fn known_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("email", &self.email),
            ("religion", &self.religion),
            ("cast", &self.cast),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.into(), Value::String(value.trim().to_string()));
            }
        }
        if let Some(role) = self.role {
            map.insert("role".into(), Value::String(role.as_str().to_string()));
        }
        map
    }
}

/// Raw image bytes taken from a multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}
