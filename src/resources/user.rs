//! `ns1_user` resource: NS1 account users.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::permissions::{add_perms_schema, permissions_to_resource_data, resource_data_to_permissions};
use crate::clients::UsersApi;
use crate::core::models::User;
use crate::errors::Ns1Error;
use crate::schema::{Resource, ResourceData, Schema, SchemaMap, ValueType};

pub const RESOURCE_NAME: &str = "ns1_user";

#[must_use]
pub fn user_schema() -> SchemaMap {
    let mut s = SchemaMap::new();
    s.insert("name".to_string(), Schema::required(ValueType::String));
    s.insert(
        "username".to_string(),
        Schema::required(ValueType::String).force_new(),
    );
    s.insert("email".to_string(), Schema::required(ValueType::String));
    // read back as `{"billing": ..}` even when left unset
    s.insert(
        "notify".to_string(),
        Schema::optional(ValueType::map_of(ValueType::Bool)).computed(),
    );
    s.insert(
        "teams".to_string(),
        Schema::optional(ValueType::list_of(ValueType::String)),
    );
    add_perms_schema(s)
}

#[must_use]
pub fn user_resource() -> Resource {
    Resource {
        schema: Arc::new(user_schema()),
        create,
        read,
        update,
        delete,
        importer: Some(import),
    }
}

fn create<'a>(d: &'a mut ResourceData, client: &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>> {
    Box::pin(user_create(d, client))
}

fn read<'a>(d: &'a mut ResourceData, client: &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>> {
    Box::pin(user_read(d, client))
}

fn update<'a>(d: &'a mut ResourceData, client: &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>> {
    Box::pin(user_update(d, client))
}

fn delete<'a>(d: &'a mut ResourceData, client: &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>> {
    Box::pin(user_delete(d, client))
}

fn import<'a>(d: &'a mut ResourceData, _client: &'a dyn UsersApi) -> BoxFuture<'a, Result<(), Ns1Error>> {
    Box::pin(async move { user_import(d) })
}

/// Write `user` into resource state. The id becomes the username.
///
/// Only the `billing` notification kind is written back; any other keys in
/// the `notify` map are dropped.
///
/// # Errors
///
/// Returns an error only if the schema lacks one of the user fields.
pub fn user_to_resource_data(d: &mut ResourceData, user: &User) -> Result<(), Ns1Error> {
    d.set_id(user.username.clone());
    d.set("name", user.name.clone())?;
    d.set("email", user.email.clone())?;
    d.set("teams", user.team_ids.clone())?;
    d.set("notify", json!({ "billing": user.notify.billing }))?;
    permissions_to_resource_data(d, &user.permissions)?;
    Ok(())
}

/// Fill `user` from resource state.
///
/// # Errors
///
/// Returns `TypeMismatch` when a field holds a value of the wrong type.
pub fn resource_data_to_user(user: &mut User, d: &ResourceData) -> Result<(), Ns1Error> {
    user.name = d.get_string("name")?;
    user.username = d.get_string("username")?;
    user.email = d.get_string("email")?;

    user.team_ids = match d.get_ok("teams")? {
        Some(_) => d.get_string_list("teams")?,
        None => Vec::new(),
    };

    if d.get_ok("notify")?.is_some() {
        let notify = d.get_bool_map("notify")?;
        user.notify.billing = notify.get("billing").copied().unwrap_or(false);
    }

    user.permissions = resource_data_to_permissions(d)?;
    Ok(())
}

/// # Errors
///
/// Returns the API error unchanged if the create or the follow-up fetch fails.
#[tracing::instrument(level = "info", skip_all)]
pub async fn user_create(d: &mut ResourceData, client: &dyn UsersApi) -> Result<(), Ns1Error> {
    let mut user = User::default();
    resource_data_to_user(&mut user, d)?;

    let created = client.create(&user).await?;
    info!(username = %created.username, teams = created.team_ids.len(), "Created NS1 user");

    // Team membership feeds server-side permissions, so the echo is stale.
    if !created.team_ids.is_empty() {
        let refreshed = client.get(&created.username).await?;
        return user_to_resource_data(d, &refreshed);
    }

    user_to_resource_data(d, &created)
}

/// # Errors
///
/// Returns the API error unchanged unless it says the user does not exist, in
/// which case the id is cleared and the call succeeds.
#[tracing::instrument(level = "info", skip_all, fields(username = %d.id()))]
pub async fn user_read(d: &mut ResourceData, client: &dyn UsersApi) -> Result<(), Ns1Error> {
    let user = match client.get(d.id()).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            debug!("NS1 user ({}) not found", d.id());
            d.set_id("");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    user_to_resource_data(d, &user)
}

/// # Errors
///
/// Returns the API error unchanged if the update or the follow-up fetch fails.
#[tracing::instrument(level = "info", skip_all, fields(username = %d.id()))]
pub async fn user_update(d: &mut ResourceData, client: &dyn UsersApi) -> Result<(), Ns1Error> {
    let mut user = User {
        username: d.id().to_string(),
        ..Default::default()
    };
    resource_data_to_user(&mut user, d)?;

    let updated = client.update(&user).await?;

    if d.has_change("teams") {
        info!("Teams changed, refreshing permissions for {}", d.id());
        let refreshed = client.get(d.id()).await?;
        return user_to_resource_data(d, &refreshed);
    }

    user_to_resource_data(d, &updated)
}

/// Deletes the remote user.
///
/// The id is cleared before the API result is inspected, so the resource
/// leaves state even when the delete call fails.
///
/// # Errors
///
/// Returns the API error unchanged.
#[tracing::instrument(level = "info", skip_all, fields(username = %d.id()))]
pub async fn user_delete(d: &mut ResourceData, client: &dyn UsersApi) -> Result<(), Ns1Error> {
    let result = client.delete(d.id()).await;
    d.set_id("");
    result
}

/// Passthrough import: the id is the username, everything else comes from
/// the read that follows.
///
/// # Errors
///
/// Returns an error if the id is empty.
pub fn user_import(d: &mut ResourceData) -> Result<(), Ns1Error> {
    let username = d.id().to_string();
    if username.is_empty() {
        return Err(Ns1Error::MissingRequired("username".to_string()));
    }
    d.set("username", Value::String(username))
}
