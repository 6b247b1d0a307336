use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::Ns1Error;

pub type StateMap = serde_json::Map<String, Value>;
pub type SchemaMap = BTreeMap<String, Schema>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Bool,
    List(Box<ValueType>),
    Map(Box<ValueType>),
}

impl ValueType {
    #[must_use]
    pub fn list_of(elem: ValueType) -> Self {
        ValueType::List(Box::new(elem))
    }

    #[must_use]
    pub fn map_of(elem: ValueType) -> Self {
        ValueType::Map(Box::new(elem))
    }

    /// Value a field takes when it has never been set.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            ValueType::String => Value::String(String::new()),
            ValueType::Bool => Value::Bool(false),
            ValueType::List(_) => Value::Array(Vec::new()),
            ValueType::Map(_) => Value::Object(StateMap::new()),
        }
    }

    /// Whether `value` has this shape. `null` stands for "unset" and always conforms.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ValueType::String, Value::String(_)) | (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::List(elem), Value::Array(items)) => {
                items.iter().all(|v| !v.is_null() && elem.conforms(v))
            }
            (ValueType::Map(elem), Value::Object(entries)) => {
                entries.values().all(|v| !v.is_null() && elem.conforms(v))
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ValueType::String => "string".to_string(),
            ValueType::Bool => "bool".to_string(),
            ValueType::List(elem) => format!("list of {}", elem.describe()),
            ValueType::Map(elem) => format!("map of {}", elem.describe()),
        }
    }
}

#[must_use]
pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[must_use]
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

/// Declaration of one resource field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub value_type: ValueType,
    pub required: bool,
    pub optional: bool,
    /// The server may fill this field in. Leaving it out of the configuration
    /// keeps whatever the prior state holds.
    pub computed: bool,
    /// A change to this field cannot be applied in place; the resource is
    /// destroyed and created again.
    pub force_new: bool,
}

impl Schema {
    #[must_use]
    pub fn required(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: true,
            optional: false,
            computed: false,
            force_new: false,
        }
    }

    #[must_use]
    pub fn optional(value_type: ValueType) -> Self {
        Self {
            required: false,
            optional: true,
            ..Self::required(value_type)
        }
    }

    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// The value a planned configuration resolves to for this field.
    #[must_use]
    pub fn resolve<'a>(&self, prior: Option<&'a Value>, planned: Option<&'a Value>) -> Option<&'a Value> {
        match planned {
            None | Some(Value::Null) if self.computed => prior,
            other => other,
        }
    }

    /// `value` with `null` or absence folded into the zero value.
    #[must_use]
    pub fn normalize(&self, value: Option<&Value>) -> Value {
        match value {
            None | Some(Value::Null) => self.value_type.zero(),
            Some(v) => v.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` when `value` does not have this field's shape.
    pub fn check(&self, field: &str, value: &Value) -> Result<(), Ns1Error> {
        if self.value_type.conforms(value) {
            Ok(())
        } else {
            Err(Ns1Error::TypeMismatch {
                field: field.to_string(),
                expected: self.value_type.describe(),
                found: describe_value(value).to_string(),
            })
        }
    }
}

/// Check a desired configuration against the schema before any API call.
///
/// # Errors
///
/// Returns `UnknownField`, `TypeMismatch` or `MissingRequired` for the first
/// offending field in key order.
pub fn validate_config(schema: &SchemaMap, config: &StateMap) -> Result<(), Ns1Error> {
    for (key, value) in config {
        let entry = schema
            .get(key)
            .ok_or_else(|| Ns1Error::UnknownField(key.clone()))?;
        entry.check(key, value)?;
    }

    for (key, entry) in schema {
        if entry.required && config.get(key).is_none_or(is_zero) {
            return Err(Ns1Error::MissingRequired(key.clone()));
        }
    }

    Ok(())
}

/// Fields whose prior and planned values differ.
#[must_use]
pub fn changed_fields(schema: &SchemaMap, prior: &StateMap, planned: &StateMap) -> Vec<String> {
    schema
        .iter()
        .filter(|(key, entry)| {
            let before = prior.get(key.as_str());
            let after = entry.resolve(before, planned.get(key.as_str()));
            entry.normalize(before) != entry.normalize(after)
        })
        .map(|(key, _)| key.clone())
        .collect()
}

/// Changed fields that cannot be updated in place.
#[must_use]
pub fn requires_replace(schema: &SchemaMap, prior: &StateMap, planned: &StateMap) -> Vec<String> {
    changed_fields(schema, prior, planned)
        .into_iter()
        .filter(|key| schema.get(key).is_some_and(|entry| entry.force_new))
        .collect()
}
