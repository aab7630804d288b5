// Orphaned upload sweep

use crate::app_data::AppData;
use crate::errors::InternalError;

/// Remove every upload no account references and report the count
pub async fn collect_orphans(app_data: &AppData) -> Result<usize, InternalError> {
    tracing::info!(dir = %app_data.stores.upload_store.dir().display(), "Collecting orphaned uploads");

    let removed = app_data.providers.account_provider.collect_orphaned_uploads().await?;

    println!("Removed {} orphaned upload(s)", removed);
    Ok(removed)
}
