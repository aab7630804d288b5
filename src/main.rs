use std::sync::Arc;

use clap::Parser;
use poem::endpoint::StaticFilesEndpoint;
use poem::listener::TcpListener;
use poem::{Route, Server};

use directory_backend::api::build_api_service;
use directory_backend::app_data::AppData;
use directory_backend::cli::{Cli, Commands, execute_command};
use directory_backend::config::{
    BootstrapSettings, SecretManager, SystemEnvironment, close_database, init_database, init_logging,
    migrate_database,
};
use directory_backend::stores::upload_store::PUBLIC_PREFIX;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging(&SystemEnvironment)?;

    let cli = Cli::parse();

    let settings = BootstrapSettings::from_env()?;
    tracing::info!(settings = ?settings, "Loaded bootstrap settings");
    let secret_manager = SecretManager::init()?;

    let db = init_database(&settings).await?;
    migrate_database(&db).await?;

    let app_data = Arc::new(AppData::new(db, settings, secret_manager));
    app_data.stores.upload_store.ensure_dir().await?;

    let result = match cli.command {
        None | Some(Commands::Serve) => serve(app_data.clone()).await,
        Some(command) => execute_command(command, &app_data).await,
    };

    close_database(app_data.db.clone()).await?;
    result
}

async fn serve(app_data: Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = app_data.settings.clone();
    let server_url = format!("{}/api", settings.public_domain());

    let api_service = build_api_service(app_data.clone(), &server_url);
    let ui = api_service.swagger_ui();

    // Compose routes: API under /api, Swagger UI under /swagger, uploads read-only
    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .nest(PUBLIC_PREFIX, StaticFilesEndpoint::new(settings.upload_dir()));

    let address = settings.server_address();
    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at {}/swagger", settings.public_domain());

    Server::new(TcpListener::bind(address))
        .run_with_graceful_shutdown(
            app,
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
                tracing::info!("Shutdown signal received");
            },
            None,
        )
        .await?;

    Ok(())
}
