use std::sync::Arc;

use serde_json::Value;

use crate::errors::InternalError;
use crate::errors::internal::{AccountError, PaymentError, ValidationError};
use crate::policy::{groups, merge_extra_fields, merge_preserving};
use crate::providers::crypto_provider::CryptoProvider;
use crate::stores::{AccountStore, UploadStore};
use crate::types::internal::account::{Account, AccountAttributes, AccountInput, ImageUpload};
use crate::types::internal::context::RequestContext;

/// Builds, validates and persists account records
///
/// Does not decide who may do what; callers apply the visibility policy
/// to the attributes this provider prepares before persisting them.
pub struct AccountProvider {
    store: Arc<AccountStore>,
    uploads: Arc<UploadStore>,
    crypto_provider: Arc<CryptoProvider>,
}

impl AccountProvider {
    pub fn new(store: Arc<AccountStore>, uploads: Arc<UploadStore>, crypto_provider: Arc<CryptoProvider>) -> Self {
        Self {
            store,
            uploads,
            crypto_provider,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Account>, InternalError> {
        self.store.list_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>, InternalError> {
        self.store.find_by_id(id).await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>, InternalError> {
        self.store.find_by_username(username).await
    }

    /// Validated attributes for a new account, password hashed
    ///
    /// # Errors
    /// * `ValidationError` - empty input, missing required field or password, bad extra field, vocabulary mismatch
    pub async fn prepare_new(&self, input: &AccountInput) -> Result<AccountAttributes, InternalError> {
        if input.is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }

        let password = input
            .password
            .as_deref()
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ValidationError::MissingField("password".to_string()))?;

        let mut form = merge_extra_fields(input.known_fields(), &input.extra_fields)?;
        form.insert(
            "password".into(),
            Value::String(self.crypto_provider.hash_password(password).await?),
        );

        let attributes = AccountAttributes::from_map(form)?;
        validate_attributes(&attributes)?;
        Ok(attributes)
    }

    /// `existing` overlaid with `input`; keys the input does not mention are kept
    ///
    /// The password hash is replaced only when a non-empty password is supplied.
    pub async fn prepare_update(
        &self,
        existing: &Account,
        input: &AccountInput,
    ) -> Result<AccountAttributes, InternalError> {
        if input.is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }

        let mut changes = merge_extra_fields(input.known_fields(), &input.extra_fields)?;
        if let Some(password) = input.password.as_deref().filter(|password| !password.is_empty()) {
            changes.insert(
                "password".into(),
                Value::String(self.crypto_provider.hash_password(password).await?),
            );
        }

        let merged = merge_preserving(existing.attributes.to_map(), changes);
        let mut attributes = AccountAttributes::from_map(merged)?;
        attributes.image = existing.attributes.image.clone();
        validate_attributes(&attributes)?;
        Ok(attributes)
    }

    /// Reject an email, username or payment order another account already holds
    ///
    /// # Errors
    /// * `AccountError::DuplicateEmail` - case-insensitive match
    /// * `AccountError::DuplicateUsername` - exact match
    /// * `PaymentError::AlreadyUsed` - the order already paid for another account
    /// * `InternalError::Parse` - a stored row cannot be decoded, so uniqueness cannot be checked
    pub async fn ensure_unique(
        &self,
        attributes: &AccountAttributes,
        exclude_id: Option<i32>,
    ) -> Result<(), InternalError> {
        for other in self.store.list_all_strict().await? {
            if Some(other.id) == exclude_id {
                continue;
            }
            if other.email().eq_ignore_ascii_case(&attributes.email) {
                return Err(AccountError::DuplicateEmail(attributes.email.clone()).into());
            }
            if let (Some(theirs), Some(ours)) = (other.username(), attributes.username.as_deref()) {
                if theirs == ours {
                    return Err(AccountError::DuplicateUsername(ours.to_string()).into());
                }
            }
            if let (Some(theirs), Some(ours)) = (
                other.attributes.payment_order_id.as_deref(),
                attributes.payment_order_id.as_deref(),
            ) {
                if theirs == ours {
                    return Err(PaymentError::AlreadyUsed {
                        order_id: ours.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Store the image (if any), then the row
    ///
    /// If the row insert fails the freshly written image is removed again.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut attributes: AccountAttributes,
        image: Option<ImageUpload>,
    ) -> Result<Account, InternalError> {
        self.ensure_unique(&attributes, None).await?;

        let new_image = match image {
            Some(upload) => Some(self.uploads.save(upload.file_name.as_deref(), &upload.bytes).await?),
            None => None,
        };
        if let Some(path) = &new_image {
            attributes.image = Some(path.clone());
        }

        match self.store.insert(&attributes).await {
            Ok(account) => {
                tracing::info!(
                    request_id = %ctx.request_id,
                    actor = %ctx.actor_id,
                    account_id = account.id,
                    role = %account.role(),
                    "Created account"
                );
                Ok(account)
            }
            Err(e) => {
                if let Some(path) = &new_image {
                    self.uploads.remove_quietly(path).await;
                }
                Err(e)
            }
        }
    }

    /// Persist prepared attributes over an existing row
    ///
    /// A new image replaces the old one; the old file is removed only after
    /// the row has been written.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        existing: &Account,
        mut attributes: AccountAttributes,
        image: Option<ImageUpload>,
    ) -> Result<Account, InternalError> {
        self.ensure_unique(&attributes, Some(existing.id)).await?;

        let new_image = match image {
            Some(upload) => Some(self.uploads.save(upload.file_name.as_deref(), &upload.bytes).await?),
            None => None,
        };
        if let Some(path) = &new_image {
            attributes.image = Some(path.clone());
        }

        let updated = match self.store.update_attributes(existing.id, &attributes).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(path) = &new_image {
                    self.uploads.remove_quietly(path).await;
                }
                return Err(e);
            }
        };

        if let (Some(_), Some(old)) = (&new_image, existing.image()) {
            self.uploads.remove_quietly(old).await;
        }

        tracing::info!(
            request_id = %ctx.request_id,
            actor = %ctx.actor_id,
            account_id = updated.id,
            "Updated account"
        );

        Ok(updated)
    }

    /// Remove the row, then its image
    ///
    /// # Errors
    /// * `AccountError::NotFound` - the row was already gone
    pub async fn delete(&self, ctx: &RequestContext, account: &Account) -> Result<(), InternalError> {
        if !self.store.delete(account.id).await? {
            return Err(AccountError::NotFound(account.id.to_string()).into());
        }

        if let Some(image) = account.image() {
            self.uploads.remove_quietly(image).await;
        }

        tracing::info!(
            request_id = %ctx.request_id,
            actor = %ctx.actor_id,
            account_id = account.id,
            "Deleted account"
        );

        Ok(())
    }

    /// Delete upload files no account references; returns how many were removed
    ///
    /// Nothing is removed when any stored row cannot be decoded.
    pub async fn collect_orphaned_uploads(&self) -> Result<usize, InternalError> {
        let referenced: std::collections::HashSet<String> = self
            .store
            .list_all_strict()
            .await?
            .into_iter()
            .filter_map(|account| account.attributes.image)
            .collect();

        let mut removed = 0;
        for path in self.uploads.list().await? {
            if !referenced.contains(&path) && self.uploads.remove(&path).await? {
                tracing::info!(file = %path, "Removed orphaned upload");
                removed += 1;
            }
        }

        Ok(removed)
    }
}

fn validate_attributes(attributes: &AccountAttributes) -> Result<(), ValidationError> {
    let email = attributes.email.as_str();
    if email.chars().any(char::is_whitespace) || !email.contains('@') {
        return Err(ValidationError::invalid_field("email", "not an email address"));
    }

    if let Some(username) = attributes.username.as_deref() {
        if username.chars().any(char::is_whitespace) || username.contains('/') {
            return Err(ValidationError::invalid_field(
                "username",
                "may not contain whitespace or '/'",
            ));
        }
    }

    groups::validate_group(attributes.religion.as_deref(), attributes.cast.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ExtraField;
    use crate::types::internal::account::Role;
    use migration::{DirectoryMigrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
    use tempfile::TempDir;

    struct Fixture {
        provider: AccountProvider,
        crypto: Arc<CryptoProvider>,
        uploads: Arc<UploadStore>,
        db: DatabaseConnection,
        _tmp: TempDir,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        DirectoryMigrator::up(&db, None).await.unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Arc::new(UploadStore::new(tmp.path()));
        let crypto = Arc::new(CryptoProvider::new("test-pepper-for-unit-tests"));
        Fixture {
            provider: AccountProvider::new(Arc::new(AccountStore::new(db.clone())), uploads.clone(), crypto.clone()),
            crypto,
            uploads,
            db,
            _tmp: tmp,
        }
    }

    fn input(username: &str) -> AccountInput {
        AccountInput {
            first_name: Some("Asha".to_string()),
            username: Some(username.to_string()),
            email: Some(format!("{}@example.com", username)),
            role: Some(Role::User),
            password: Some("hunter22".to_string()),
            religion: Some("Hinduism".to_string()),
            cast: Some("Reddy".to_string()),
            ..Default::default()
        }
    }

    fn png() -> Option<ImageUpload> {
        Some(ImageUpload {
            file_name: Some("face.png".to_string()),
            bytes: b"png".to_vec(),
        })
    }

    async fn create(fx: &Fixture, input: &AccountInput, image: Option<ImageUpload>) -> Account {
        let ctx = RequestContext::for_system("test");
        let attributes = fx.provider.prepare_new(input).await.unwrap();
        fx.provider.create(&ctx, attributes, image).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let fx = setup().await;
        let mut new = input("asha");
        new.extra_fields = vec![ExtraField::new("Village", "Kondapur")];

        let created = create(&fx, &new, None).await;
        let fetched = fx.provider.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert!(fetched.created_at > 0);
        assert_eq!(fetched.attributes.extra_fields["village"], Value::from("Kondapur"));
        let hash = fetched.attributes.password_hash.as_deref().unwrap();
        assert_ne!(hash, "hunter22");
        assert!(fx.crypto.verify_password(hash, "hunter22").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_password_and_known_fields() {
        let fx = setup().await;

        let mut no_password = input("asha");
        no_password.password = None;
        assert!(matches!(
            fx.provider.prepare_new(&no_password).await,
            Err(InternalError::Validation(ValidationError::MissingField(ref f))) if f == "password"
        ));

        let mut no_email = input("asha");
        no_email.email = None;
        assert!(matches!(
            fx.provider.prepare_new(&no_email).await,
            Err(InternalError::Validation(ValidationError::MissingField(ref f))) if f == "email"
        ));

        assert!(matches!(
            fx.provider.prepare_new(&AccountInput::default()).await,
            Err(InternalError::Validation(ValidationError::EmptyBody))
        ));
    }

    #[tokio::test]
    async fn test_vocabulary_is_enforced() {
        let fx = setup().await;
        let mut wrong_cast = input("asha");
        wrong_cast.cast = Some("Syed".to_string());

        let result = fx.provider.prepare_new(&wrong_cast).await;

        assert!(matches!(
            result,
            Err(InternalError::Validation(ValidationError::CastNotInReligion { .. }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_and_username_conflict() {
        let fx = setup().await;
        create(&fx, &input("asha"), None).await;
        let ctx = RequestContext::for_system("test");

        let mut same_email = input("other");
        same_email.email = Some("ASHA@example.com".to_string());
        let attributes = fx.provider.prepare_new(&same_email).await.unwrap();
        assert!(matches!(
            fx.provider.create(&ctx, attributes, None).await,
            Err(InternalError::Account(AccountError::DuplicateEmail(_)))
        ));

        let mut same_username = input("asha");
        same_username.email = Some("fresh@example.com".to_string());
        let attributes = fx.provider.prepare_new(&same_username).await.unwrap();
        assert!(matches!(
            fx.provider.create(&ctx, attributes, None).await,
            Err(InternalError::Account(AccountError::DuplicateUsername(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_password() {
        let fx = setup().await;
        let mut new = input("asha");
        new.extra_fields = vec![ExtraField::new("a", 1), ExtraField::new("b", 2)];
        let created = create(&fx, &new, None).await;
        let ctx = RequestContext::for_system("test");

        let change = AccountInput {
            last_name: Some("Reddy".to_string()),
            extra_fields: vec![ExtraField::new("B", 3)],
            ..Default::default()
        };
        let attributes = fx.provider.prepare_update(&created, &change).await.unwrap();
        let updated = fx.provider.update(&ctx, &created, attributes, None).await.unwrap();

        assert_eq!(updated.attributes.last_name.as_deref(), Some("Reddy"));
        assert_eq!(updated.attributes.first_name, "Asha");
        assert_eq!(updated.attributes.extra_fields["a"], Value::from(1));
        assert_eq!(updated.attributes.extra_fields["b"], Value::from(3));
        assert_eq!(updated.attributes.password_hash, created.attributes.password_hash);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_rehashes_supplied_password() {
        let fx = setup().await;
        let created = create(&fx, &input("asha"), None).await;
        let ctx = RequestContext::for_system("test");

        let change = AccountInput {
            password: Some("new-password".to_string()),
            ..Default::default()
        };
        let attributes = fx.provider.prepare_update(&created, &change).await.unwrap();
        let updated = fx.provider.update(&ctx, &created, attributes, None).await.unwrap();

        let hash = updated.attributes.password_hash.as_deref().unwrap();
        assert!(fx.crypto.verify_password(hash, "new-password").await.unwrap());
    }

    #[tokio::test]
    async fn test_new_image_replaces_old_file() {
        let fx = setup().await;
        let created = create(&fx, &input("asha"), png()).await;
        let old_image = created.image().unwrap().to_string();
        let ctx = RequestContext::for_system("test");

        let change = AccountInput {
            first_name: Some("Asha".to_string()),
            ..Default::default()
        };
        let attributes = fx.provider.prepare_update(&created, &change).await.unwrap();
        let updated = fx.provider.update(&ctx, &created, attributes, png()).await.unwrap();

        let new_image = updated.image().unwrap();
        assert_ne!(new_image, old_image);
        assert_eq!(fx.uploads.list().await.unwrap(), vec![new_image.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_image() {
        let fx = setup().await;
        let created = create(&fx, &input("asha"), png()).await;
        let ctx = RequestContext::for_system("test");

        fx.provider.delete(&ctx, &created).await.unwrap();

        assert!(fx.provider.get_by_id(created.id).await.unwrap().is_none());
        assert!(fx.uploads.list().await.unwrap().is_empty());
        assert!(matches!(
            fx.provider.delete(&ctx, &created).await,
            Err(InternalError::Account(AccountError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_collect_orphaned_uploads() {
        let fx = setup().await;
        let kept = create(&fx, &input("asha"), png()).await;
        fx.uploads.save(Some("stray.png"), b"stray").await.unwrap();

        let removed = fx.provider.collect_orphaned_uploads().await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(fx.uploads.list().await.unwrap(), vec![kept.image().unwrap().to_string()]);
    }

    async fn insert_raw(fx: &Fixture, user_info: &str) {
        let backend = fx.db.get_database_backend();
        fx.db
            .execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO users (user_info, created_at) VALUES (?, 1)",
                [user_info.into()],
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_orphan_sweep_keeps_files_when_a_row_is_undecodable() {
        let fx = setup().await;
        let referenced = fx.uploads.save(Some("face.png"), b"png").await.unwrap();
        insert_raw(
            &fx,
            &serde_json::json!({
                "first_name": "Old",
                "email": "old@example.com",
                "role": "owner",
                "image": referenced,
            })
            .to_string(),
        )
        .await;

        let result = fx.provider.collect_orphaned_uploads().await;

        assert!(matches!(result, Err(InternalError::Parse { .. })));
        assert_eq!(fx.uploads.list().await.unwrap(), vec![referenced]);
    }

    #[tokio::test]
    async fn test_uniqueness_check_fails_on_undecodable_row() {
        let fx = setup().await;
        insert_raw(&fx, r#"{"first_name":"Old","email":"asha@example.com","role":"owner"}"#).await;
        let ctx = RequestContext::for_system("test");

        let attributes = fx.provider.prepare_new(&input("asha")).await.unwrap();
        let result = fx.provider.create(&ctx, attributes, None).await;

        assert!(matches!(result, Err(InternalError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_payment_order_pays_for_one_account() {
        let fx = setup().await;
        let ctx = RequestContext::for_system("test");

        let mut first = fx.provider.prepare_new(&input("asha")).await.unwrap();
        first.payment_order_id = Some("order_1".to_string());
        fx.provider.create(&ctx, first, None).await.unwrap();

        let mut second = fx.provider.prepare_new(&input("ravi")).await.unwrap();
        second.payment_order_id = Some("order_1".to_string());
        let result = fx.provider.create(&ctx, second, None).await;

        assert!(matches!(
            result,
            Err(InternalError::Payment(PaymentError::AlreadyUsed { ref order_id })) if order_id == "order_1"
        ));
    }
}
