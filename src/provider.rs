//! Provider registry and apply engine.
//!
//! Turns a (prior state, planned config) pair into calls on a resource's
//! lifecycle slots:
//! - no prior state: validate and create
//! - no planned config: delete
//! - both, with a force-new field changed: delete, then create
//! - both, with other changes: validate and update
//! - both, identical: nothing to do

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::clients::{Ns1Client, UsersApi};
use crate::core::config::ProviderConfig;
use crate::errors::Ns1Error;
use crate::resources::{USER_RESOURCE, user_resource};
use crate::schema::{
    InstanceState, Resource, ResourceData, StateMap, changed_fields, requires_replace,
    validate_config,
};

/// A failed operation together with the state the resource was left in.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApplyError {
    pub state: Option<InstanceState>,
    #[source]
    pub error: Ns1Error,
}

impl ApplyError {
    #[must_use]
    pub fn new(state: Option<InstanceState>, error: Ns1Error) -> Self {
        Self { state, error }
    }
}

pub type ApplyResult = Result<Option<InstanceState>, ApplyError>;

pub struct Provider {
    client: Arc<dyn UsersApi>,
    resources: BTreeMap<&'static str, Resource>,
}

impl Provider {
    #[must_use]
    pub fn new(client: Arc<dyn UsersApi>) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(USER_RESOURCE, user_resource());
        Self { client, resources }
    }

    /// # Errors
    ///
    /// Returns an error if the NS1 client cannot be built from `config`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, Ns1Error> {
        let client = Ns1Client::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// # Errors
    ///
    /// Returns `UnknownResource` if no resource type is registered under `type_name`.
    pub fn resource(&self, type_name: &str) -> Result<&Resource, Ns1Error> {
        self.resources
            .get(type_name)
            .ok_or_else(|| Ns1Error::UnknownResource(type_name.to_string()))
    }

    /// Reconcile one resource instance from `prior` towards `planned`.
    ///
    /// # Errors
    ///
    /// Returns an `ApplyError` carrying the resulting state when validation or
    /// any lifecycle call fails.
    pub async fn apply(
        &self,
        type_name: &str,
        prior: Option<InstanceState>,
        planned: Option<StateMap>,
    ) -> ApplyResult {
        let resource = self
            .resource(type_name)
            .map_err(|e| ApplyError::new(prior.clone(), e))?;

        match (prior, planned) {
            (None, None) => Ok(None),
            (None, Some(planned)) => self.run_create(resource, planned).await,
            (Some(prior), None) => self.run_delete(resource, &prior).await,
            (Some(prior), Some(planned)) => {
                if let Err(e) = validate_config(&resource.schema, &planned) {
                    return Err(ApplyError::new(Some(prior), e));
                }

                let replace = requires_replace(&resource.schema, &prior.attributes, &planned);
                if !replace.is_empty() {
                    info!(fields = ?replace, "Replacing {} {}", type_name, prior.id);
                    self.run_delete(resource, &prior).await?;
                    return self.run_create(resource, planned).await;
                }

                if changed_fields(&resource.schema, &prior.attributes, &planned).is_empty() {
                    debug!("No changes for {} {}", type_name, prior.id);
                    return Ok(Some(prior));
                }

                self.run_update(resource, prior, planned).await
            }
        }
    }

    /// Re-read an instance from the remote API.
    ///
    /// # Errors
    ///
    /// Returns an `ApplyError` holding the unchanged state if the read fails.
    pub async fn refresh(&self, type_name: &str, state: InstanceState) -> ApplyResult {
        let resource = self
            .resource(type_name)
            .map_err(|e| ApplyError::new(Some(state.clone()), e))?;

        let mut d = ResourceData::from_state(resource.schema.clone(), &state);
        let result = (resource.read)(&mut d, self.client.as_ref()).await;
        finish(&d, result, Some(state))
    }

    /// Bring an existing remote object under management by its id.
    ///
    /// # Errors
    ///
    /// Returns an `ApplyError` if the type cannot be imported or the read fails.
    pub async fn import(&self, type_name: &str, id: &str) -> ApplyResult {
        let resource = self
            .resource(type_name)
            .map_err(|e| ApplyError::new(None, e))?;
        let importer = resource.importer.ok_or_else(|| {
            ApplyError::new(
                None,
                Ns1Error::GeneralError(format!("{type_name} does not support import")),
            )
        })?;

        info!("Importing {} {}", type_name, id);
        let mut d = ResourceData::new(resource.schema.clone(), id, StateMap::new(), None);
        if let Err(e) = importer(&mut d, self.client.as_ref()).await {
            return Err(ApplyError::new(None, e));
        }
        let result = (resource.read)(&mut d, self.client.as_ref()).await;
        finish(&d, result, None)
    }

    async fn run_create(&self, resource: &Resource, planned: StateMap) -> ApplyResult {
        validate_config(&resource.schema, &planned).map_err(|e| ApplyError::new(None, e))?;

        let mut d = ResourceData::for_create(resource.schema.clone(), planned);
        let result = (resource.create)(&mut d, self.client.as_ref()).await;
        finish(&d, result, None)
    }

    async fn run_update(
        &self,
        resource: &Resource,
        prior: InstanceState,
        planned: StateMap,
    ) -> ApplyResult {
        let mut d = ResourceData::for_update(resource.schema.clone(), &prior, planned);
        let result = (resource.update)(&mut d, self.client.as_ref()).await;
        finish(&d, result, Some(prior))
    }

    async fn run_delete(&self, resource: &Resource, prior: &InstanceState) -> ApplyResult {
        let mut d = ResourceData::from_state(resource.schema.clone(), prior);
        let result = (resource.delete)(&mut d, self.client.as_ref()).await;
        finish(&d, result, Some(prior.clone()))
    }
}

/// On failure the instance keeps `fallback` unless the operation already
/// cleared its id.
fn finish(d: &ResourceData, result: Result<(), Ns1Error>, fallback: Option<InstanceState>) -> ApplyResult {
    match result {
        Ok(()) => Ok(d.state()),
        Err(error) => {
            let state = if d.id().is_empty() { None } else { fallback };
            Err(ApplyError::new(state, error))
        }
    }
}
