//! Resource types served by the provider.

pub mod permissions;
pub mod user;

pub use user::{RESOURCE_NAME as USER_RESOURCE, user_resource};
