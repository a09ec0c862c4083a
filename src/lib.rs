/// Admin Users - callable endpoints that let an admin create, update and delete
/// users across an identity provider and a profile document store.
///
/// Each operation checks the caller's admin claim, validates its input, then
/// writes the identity provider first and the profile store second. The two
/// writes are not coordinated: if the second fails, the first stays applied.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution, behind an API Gateway JWT authorizer
/// - An identity toolkit REST API for credentials
/// - A document store REST API for profile documents
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use admin_users::clients::{InMemoryIdentityProvider, InMemoryProfileStore};
/// use admin_users::core::models::{CreateUserRequest, Password};
/// use admin_users::core::principal::Principal;
/// use admin_users::users::AdminUserService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     admin_users::setup_logging();
///
///     let service = AdminUserService::new(
///         Arc::new(InMemoryIdentityProvider::new()),
///         Arc::new(InMemoryProfileStore::new()),
///     );
///
///     let mut claims = serde_json::Map::new();
///     claims.insert("admin".into(), serde_json::Value::Bool(true));
///     let admin = Principal::verified(Some("admin-1".into()), claims);
///
///     let created = service
///         .create_user(
///             Some(&admin),
///             CreateUserRequest {
///                 email: "ann@example.com".into(),
///                 password: Password::new("secret123"),
///                 display_name: "Ann".into(),
///                 ..Default::default()
///             },
///         )
///         .await?;
///     println!("{}: {}", created.message, created.uid);
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod users;
pub mod utils;

pub use errors::AdminError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. Calling it more than once is harmless; only
/// the first call installs the subscriber.
///
/// # Example
///
/// ```
/// admin_users::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
