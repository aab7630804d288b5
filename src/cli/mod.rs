// CLI module for administrative operations requiring server access

pub mod bootstrap;
pub mod gc_uploads;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Directory backend server and admin CLI
#[derive(Parser)]
#[command(name = "directory-backend")]
#[command(about = "Role-scoped user directory backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Create the first super-admin account
    Bootstrap(bootstrap::BootstrapArgs),

    /// Delete uploaded files no account references
    GcUploads,
}

/// Execute a non-server CLI command
///
/// # Returns
/// * `Ok(())` - Command executed successfully
/// * `Err(...)` - Command execution failed
pub async fn execute_command(command: Commands, app_data: &AppData) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => {}
        Commands::Bootstrap(args) => {
            bootstrap::bootstrap_super_admin(app_data, args).await?;
        }
        Commands::GcUploads => {
            gc_uploads::collect_orphans(app_data).await?;
        }
    }
    Ok(())
}
