//! In-memory `UsersApi` that records every call.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ns1_provider::Ns1Error;
use ns1_provider::clients::UsersApi;
use ns1_provider::core::models::{PermissionsMap, User};
use ns1_provider::schema::{InstanceState, ResourceData, StateMap};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Create(String),
    Update(String),
    Delete(String),
}

type FailFn = Box<dyn Fn() -> Ns1Error + Send + Sync>;

#[derive(Default)]
pub struct FakeUsersApi {
    users: Mutex<HashMap<String, User>>,
    calls: Mutex<Vec<Call>>,
    fail_get: Option<FailFn>,
    fail_create: Option<FailFn>,
    fail_delete: Option<FailFn>,
}

/// Grants the server derives from team membership.
pub fn team_permissions() -> PermissionsMap {
    let mut p = PermissionsMap::default();
    p.dns.view_zones = true;
    p.monitoring.view_jobs = true;
    p
}

impl FakeUsersApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.store(&user);
        self
    }

    pub fn failing_get(mut self, f: impl Fn() -> Ns1Error + Send + Sync + 'static) -> Self {
        self.fail_get = Some(Box::new(f));
        self
    }

    pub fn failing_create(mut self, f: impl Fn() -> Ns1Error + Send + Sync + 'static) -> Self {
        self.fail_create = Some(Box::new(f));
        self
    }

    pub fn failing_delete(mut self, f: impl Fn() -> Ns1Error + Send + Sync + 'static) -> Self {
        self.fail_delete = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self, username: &str) -> Option<User> {
        self.users.lock().unwrap().get(username).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store(&self, user: &User) {
        let mut stored = user.clone();
        if !stored.team_ids.is_empty() {
            stored.permissions = team_permissions();
        }
        self.users
            .lock()
            .unwrap()
            .insert(stored.username.clone(), stored);
    }
}

#[async_trait]
impl UsersApi for FakeUsersApi {
    async fn get(&self, username: &str) -> Result<User, Ns1Error> {
        self.record(Call::Get(username.to_string()));
        if let Some(fail) = &self.fail_get {
            return Err(fail());
        }
        self.stored(username)
            .ok_or_else(|| Ns1Error::NotFound(format!("GET account/users/{username}: 404 User not found")))
    }

    async fn create(&self, user: &User) -> Result<User, Ns1Error> {
        self.record(Call::Create(user.username.clone()));
        if let Some(fail) = &self.fail_create {
            return Err(fail());
        }
        self.store(user);
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, Ns1Error> {
        self.record(Call::Update(user.username.clone()));
        self.store(user);
        Ok(user.clone())
    }

    async fn delete(&self, username: &str) -> Result<(), Ns1Error> {
        self.record(Call::Delete(username.to_string()));
        if let Some(fail) = &self.fail_delete {
            return Err(fail());
        }
        self.users.lock().unwrap().remove(username);
        Ok(())
    }
}

pub fn shared(api: FakeUsersApi) -> Arc<FakeUsersApi> {
    Arc::new(api)
}

pub fn map(v: Value) -> StateMap {
    v.as_object().cloned().expect("object literal")
}

pub fn user(username: &str, teams: &[&str]) -> User {
    User {
        name: format!("{username} name"),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        team_ids: teams.iter().map(|t| (*t).to_string()).collect(),
        ..Default::default()
    }
}

pub fn state_of(d: &ResourceData) -> InstanceState {
    d.state().expect("resource should still be present")
}
