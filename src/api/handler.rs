//! Request router for the stdio driver.
//!
//! A request names an action and a resource type; the response always carries
//! the resulting state, and on failure the error text alongside it.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};
use uuid::Uuid;

use crate::provider::{ApplyResult, Provider};
use crate::schema::{InstanceState, StateMap};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Apply {
        resource_type: String,
        #[serde(default)]
        prior: Option<InstanceState>,
        #[serde(default)]
        planned: Option<StateMap>,
    },
    Refresh {
        resource_type: String,
        state: InstanceState,
    },
    Import {
        resource_type: String,
        id: String,
    },
}

impl Request {
    #[must_use]
    pub fn resource_type(&self) -> &str {
        match self {
            Request::Apply { resource_type, .. }
            | Request::Refresh { resource_type, .. }
            | Request::Import { resource_type, .. } => resource_type,
        }
    }
}

#[must_use]
pub fn ok_response(state: Option<&InstanceState>) -> Value {
    json!({ "ok": true, "state": state })
}

#[must_use]
pub fn err_response(message: &str, state: Option<&InstanceState>) -> Value {
    json!({ "ok": false, "error": message, "state": state })
}

/// Run one request against the provider and render the outcome.
#[tracing::instrument(level = "info", skip_all, fields(correlation_id = %Uuid::new_v4(), resource_type = %request.resource_type()))]
pub async fn handle(provider: &Provider, request: Request) -> Value {
    let result: ApplyResult = match request {
        Request::Apply {
            resource_type,
            prior,
            planned,
        } => provider.apply(&resource_type, prior, planned).await,
        Request::Refresh {
            resource_type,
            state,
        } => provider.refresh(&resource_type, state).await,
        Request::Import { resource_type, id } => provider.import(&resource_type, &id).await,
    };

    match result {
        Ok(state) => {
            info!(present = state.is_some(), "Request completed");
            ok_response(state.as_ref())
        }
        Err(e) => {
            error!("Request failed: {}", e);
            err_response(&e.to_string(), e.state.as_ref())
        }
    }
}

/// # Errors
///
/// Returns the JSON error when `body` is not a valid request.
pub fn parse_request(body: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(body)
}
