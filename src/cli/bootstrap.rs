// Bootstrap command implementation
// Creates the first super-admin account during system setup

use clap::Args;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::AccountError;
use crate::types::internal::account::{Account, AccountInput, Role};
use crate::types::internal::context::RequestContext;

#[derive(Args, Debug, Clone)]
pub struct BootstrapArgs {
    #[arg(long)]
    pub email: String,

    /// Generated and printed once when omitted
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,
}

/// Create the super-admin and print its credentials
pub async fn bootstrap_super_admin(app_data: &AppData, args: BootstrapArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Directory Bootstrap ===\n");

    let generated = args.password.is_none();
    let password = args
        .password
        .clone()
        .unwrap_or_else(|| app_data.providers.crypto_provider.generate_secure_password());

    let account = create_super_admin(app_data, &args, &password).await?;

    println!("Super-admin created");
    println!("  id:    {}", account.id);
    println!("  email: {}", account.email());
    if generated {
        println!("  password: {}", password);
        println!("\nStore this password now; it is not shown again.");
    }

    Ok(())
}

/// # Errors
/// * `AccountError::SuperAdminExists` - bootstrap already ran
/// * `ValidationError` / `AccountError` - same rules as any new account
pub async fn create_super_admin(
    app_data: &AppData,
    args: &BootstrapArgs,
    password: &str,
) -> Result<Account, InternalError> {
    let ctx = RequestContext::for_cli("bootstrap");

    if app_data.stores.account_store.exists_with_role(Role::SuperAdmin).await? {
        tracing::warn!(actor = %ctx.actor_id, "Bootstrap refused: super-admin already exists");
        return Err(AccountError::SuperAdminExists.into());
    }

    let input = AccountInput {
        first_name: Some(args.first_name.clone()),
        last_name: args.last_name.clone(),
        username: args.username.clone(),
        email: Some(args.email.clone()),
        role: Some(Role::SuperAdmin),
        password: Some(password.to_string()),
        ..Default::default()
    };

    let provider = &app_data.providers.account_provider;
    let attributes = provider.prepare_new(&input).await?;
    let account = provider.create(&ctx, attributes, None).await?;

    tracing::info!(actor = %ctx.actor_id, account_id = account.id, "Bootstrapped super-admin");
    Ok(account)
}
