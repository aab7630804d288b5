use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde_json::{Map, Value};

use crate::errors::InternalError;
use crate::errors::internal::AccountError;
use crate::types::db::user::{self, ActiveModel, Entity as User};
use crate::types::internal::account::{Account, AccountAttributes, Role};

/// AccountStore persists directory accounts in the single `users` table
///
/// Every attribute lives in the `user_info` JSON blob; only `id` and
/// `created_at` have their own columns. Lookups by username or email decode
/// the blobs in process so the same code runs on SQLite and MySQL.
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new account; `id` and `created_at` are assigned here
    pub async fn insert(&self, attributes: &AccountAttributes) -> Result<Account, InternalError> {
        let new_account = ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_info: Set(encode(attributes)?),
            created_at: Set(Utc::now().timestamp()),
        };

        let model = new_account
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_account", e))?;

        decode(model)
    }

    /// Fetch one account by id
    ///
    /// A row that exists but cannot be decoded is an error here, unlike in [`Self::list_all`].
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Account>, InternalError> {
        User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_account_by_id", e))?
            .map(decode)
            .transpose()
    }

    async fn all_rows(&self) -> Result<Vec<user::Model>, InternalError> {
        User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_accounts", e))
    }

    /// Every decodable account, oldest first
    ///
    /// Rows with a corrupt blob are skipped with a warning so one bad record
    /// cannot take the whole directory offline.
    pub async fn list_all(&self) -> Result<Vec<Account>, InternalError> {
        let models = self.all_rows().await?;

        let mut accounts = Vec::with_capacity(models.len());
        for model in models {
            let id = model.id;
            match decode(model) {
                Ok(account) => accounts.push(account),
                Err(e) => tracing::warn!(account_id = id, error = %e, "Skipping undecodable account row"),
            }
        }

        Ok(accounts)
    }

    /// Every account, oldest first, failing on the first row that cannot be decoded
    ///
    /// For callers that must see the whole table: uniqueness checks and the upload sweep.
    pub async fn list_all_strict(&self) -> Result<Vec<Account>, InternalError> {
        self.all_rows().await?.into_iter().map(decode).collect()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, InternalError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|account| account.username() == Some(username)))
    }

    /// Case-insensitive on the email address
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, InternalError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|account| account.email().eq_ignore_ascii_case(email)))
    }

    pub async fn exists_with_role(&self, role: Role) -> Result<bool, InternalError> {
        Ok(self.list_all_strict().await?.iter().any(|account| account.role() == role))
    }

    /// Replace the stored attributes of an existing account
    ///
    /// # Errors
    /// * `AccountError::NotFound` - no row with this id
    pub async fn update_attributes(
        &self,
        id: i32,
        attributes: &AccountAttributes,
    ) -> Result<Account, InternalError> {
        let model = User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_account_for_update", e))?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        let mut active: ActiveModel = model.into();
        active.user_info = Set(encode(attributes)?);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_account", e))?;

        decode(updated)
    }

    /// Delete one row; `false` when nothing was deleted
    pub async fn delete(&self, id: i32) -> Result<bool, InternalError> {
        let result = User::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_account", e))?;

        Ok(result.rows_affected > 0)
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("db", &"<connection>")
            .finish()
    }
}

fn encode(attributes: &AccountAttributes) -> Result<String, InternalError> {
    serde_json::to_string(&Value::Object(attributes.to_map()))
        .map_err(|e| InternalError::parse("user_info", e.to_string()))
}

fn decode(model: user::Model) -> Result<Account, InternalError> {
    let map: Map<String, Value> = serde_json::from_str(&model.user_info)
        .map_err(|e| InternalError::parse("user_info", format!("account {}: {}", model.id, e)))?;

    let attributes = AccountAttributes::from_map(map)
        .map_err(|e| InternalError::parse("user_info", format!("account {}: {}", model.id, e)))?;

    Ok(Account {
        id: model.id,
        attributes,
        created_at: model.created_at,
    })
}
