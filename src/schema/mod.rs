//! Generic resource-state layer: field schemas, per-operation instance data and
//! the resource descriptor the provider engine drives.

pub mod resource;
pub mod resource_data;
pub mod types;

pub use resource::{LifecycleFn, Resource};
pub use resource_data::{InstanceState, ResourceData};
pub use types::{
    Schema, SchemaMap, StateMap, ValueType, changed_fields, requires_replace, validate_config,
};
