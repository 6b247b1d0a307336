use std::sync::Arc;

use futures::future::BoxFuture;

use super::resource_data::ResourceData;
use super::types::SchemaMap;
use crate::clients::UsersApi;
use crate::errors::Ns1Error;

/// One lifecycle step. Receives the instance being operated on and the shared
/// API client.
pub type LifecycleFn =
    for<'a> fn(&'a mut ResourceData, &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>>;

/// A resource type as registered with the provider: its field schema and the
/// callbacks the apply engine drives.
#[derive(Clone)]
pub struct Resource {
    pub schema: Arc<SchemaMap>,
    pub create: LifecycleFn,
    pub read: LifecycleFn,
    pub update: LifecycleFn,
    pub delete: LifecycleFn,
    /// Prepares a bare id for the follow-up read during import.
    pub importer: Option<LifecycleFn>,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("fields", &self.schema.keys().collect::<Vec<_>>())
            .field("importable", &self.importer.is_some())
            .finish_non_exhaustive()
    }
}
