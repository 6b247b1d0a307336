/// NS1 provider - declarative management of NS1 account users.
///
/// This crate maps the `ns1_user` resource onto the NS1 account REST API:
/// 1. A generic resource-state layer (`schema`) holding field schemas and
///    per-operation instance data
/// 2. The user resource adapter (`resources::user`) translating between that
///    state and the `User` domain object, and driving create/read/update/delete
/// 3. A reqwest-backed API client (`clients`) behind the `UsersApi` trait
/// 4. An apply engine (`provider`) deciding between create, update, replace
///    and delete, and a JSON request router (`api`) for the `ns1-user` binary
///
/// # Example
///
/// ```no_run
/// use ns1_provider::core::config::ProviderConfig;
/// use ns1_provider::provider::Provider;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     ns1_provider::setup_logging();
///
///     let config = ProviderConfig::from_env()?;
///     let provider = Provider::from_config(&config)?;
///
///     let planned = json!({
///         "name": "Alice",
///         "username": "alice",
///         "email": "alice@example.com",
///         "teams": ["teamA"],
///     });
///     let state = provider
///         .apply("ns1_user", None, planned.as_object().cloned())
///         .await?;
///
///     if let Some(state) = state {
///         println!("created {}", state.id);
///     }
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod provider;
pub mod resources;
pub mod schema;

pub use errors::Ns1Error;

/// Configure structured JSON logging on stderr.
///
/// Stdout is left free for the state documents the driver prints. The level
/// comes from `RUST_LOG` and defaults to `info`. Calling this more than once
/// is harmless.
///
/// # Example
///
/// ```
/// ns1_provider::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    // a host or an earlier call may already own the global subscriber
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
    {
        tracing::debug!("Keeping existing subscriber: {}", e);
    }
}
