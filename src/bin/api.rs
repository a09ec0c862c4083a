use admin_users::api::handler;
use admin_users::core::config::AppConfig;
use admin_users::users::AdminUserService;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    admin_users::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    info!(backend = ?config.backend, collection = %config.profile_collection, "Starting admin users API");

    // Collaborators are built once per process and shared by every invocation.
    let service = AdminUserService::from_config(&config).map_err(|e| {
        error!("Failed to initialize collaborators: {}", e);
        Error::from(e.to_string())
    })?;
    let service = &service;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(service, event).await
    }))
    .await
}
