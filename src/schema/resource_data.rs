//! Per-operation view over one resource instance.
//!
//! Reads resolve to the value written during the current operation, else the
//! planned configuration when there is one, else the prior state. A computed
//! field left out of the plan reads from the prior state. Anything unset reads
//! as the field's zero value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{SchemaMap, StateMap, describe_value, is_zero};
use crate::errors::Ns1Error;

/// Persisted state of one resource instance, keyed by its external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    pub id: String,
    #[serde(default)]
    pub attributes: StateMap,
}

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<SchemaMap>,
    id: String,
    state: StateMap,
    planned: Option<StateMap>,
    written: StateMap,
}

impl ResourceData {
    #[must_use]
    pub fn new(
        schema: Arc<SchemaMap>,
        id: impl Into<String>,
        state: StateMap,
        planned: Option<StateMap>,
    ) -> Self {
        Self {
            schema,
            id: id.into(),
            state,
            planned,
            written: StateMap::new(),
        }
    }

    #[must_use]
    pub fn for_create(schema: Arc<SchemaMap>, planned: StateMap) -> Self {
        Self::new(schema, String::new(), StateMap::new(), Some(planned))
    }

    #[must_use]
    pub fn from_state(schema: Arc<SchemaMap>, state: &InstanceState) -> Self {
        Self::new(schema, state.id.clone(), state.attributes.clone(), None)
    }

    #[must_use]
    pub fn for_update(schema: Arc<SchemaMap>, prior: &InstanceState, planned: StateMap) -> Self {
        Self::new(
            schema,
            prior.id.clone(),
            prior.attributes.clone(),
            Some(planned),
        )
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// An empty id marks the resource as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    fn raw(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.written.get(key) {
            return Some(v);
        }
        match (&self.planned, self.schema.get(key)) {
            (Some(planned), Some(entry)) => entry.resolve(self.state.get(key), planned.get(key)),
            (Some(planned), None) => planned.get(key),
            (None, _) => self.state.get(key),
        }
    }

    /// # Errors
    ///
    /// Returns `UnknownField` if `key` is not in the schema.
    pub fn get(&self, key: &str) -> Result<Value, Ns1Error> {
        let entry = self
            .schema
            .get(key)
            .ok_or_else(|| Ns1Error::UnknownField(key.to_string()))?;
        Ok(entry.normalize(self.raw(key)))
    }

    /// The value of `key` if it is set to something other than its zero value.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if `key` is not in the schema.
    pub fn get_ok(&self, key: &str) -> Result<Option<Value>, Ns1Error> {
        let value = self.get(key)?;
        Ok((!is_zero(&value)).then_some(value))
    }

    /// # Errors
    ///
    /// Returns `UnknownField` if `key` is not in the schema, or
    /// `TypeMismatch` if `value` does not have the declared shape.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), Ns1Error> {
        let entry = self
            .schema
            .get(key)
            .ok_or_else(|| Ns1Error::UnknownField(key.to_string()))?;
        let value = value.into();
        entry.check(key, &value)?;
        self.written.insert(key.to_string(), value);
        Ok(())
    }

    /// Whether the planned configuration differs from the prior state for `key`.
    #[must_use]
    pub fn has_change(&self, key: &str) -> bool {
        let (Some(entry), Some(planned)) = (self.schema.get(key), &self.planned) else {
            return false;
        };
        let prior = self.state.get(key);
        entry.normalize(prior) != entry.normalize(entry.resolve(prior, planned.get(key)))
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` if the stored value is not a string.
    pub fn get_string(&self, key: &str) -> Result<String, Ns1Error> {
        match self.get(key)? {
            Value::String(s) => Ok(s),
            other => Err(mismatch(key, "string", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` if the stored value is not a bool.
    pub fn get_bool(&self, key: &str) -> Result<bool, Ns1Error> {
        match self.get(key)? {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(key, "bool", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value is not a list or holds a non-string.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, Ns1Error> {
        match self.get(key)? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(s) => Ok(s),
                    other => Err(mismatch(&format!("{key}.{i}"), "string", &other)),
                })
                .collect(),
            other => Err(mismatch(key, "list of string", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value is not a map or holds a non-bool.
    pub fn get_bool_map(&self, key: &str) -> Result<BTreeMap<String, bool>, Ns1Error> {
        match self.get(key)? {
            Value::Object(entries) => entries
                .into_iter()
                .map(|(k, v)| match v {
                    Value::Bool(b) => Ok((k, b)),
                    other => Err(mismatch(&format!("{key}.{k}"), "bool", &other)),
                })
                .collect(),
            other => Err(mismatch(key, "map of bool", &other)),
        }
    }

    /// Final state to persist, or `None` once the id has been cleared.
    #[must_use]
    pub fn state(&self) -> Option<InstanceState> {
        if self.id.is_empty() {
            return None;
        }
        let attributes = self
            .schema
            .iter()
            .map(|(key, entry)| (key.clone(), entry.normalize(self.raw(key))))
            .collect();
        Some(InstanceState {
            id: self.id.clone(),
            attributes,
        })
    }
}

fn mismatch(field: &str, expected: &str, found: &Value) -> Ns1Error {
    Ns1Error::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        found: describe_value(found).to_string(),
    }
}
