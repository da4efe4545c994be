use crate::{DISCRIMINATOR, schema::TypeDescriptor};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("Unknown field '{type_name}.{field}'")]
    UnknownField { type_name: String, field: String },
}

/// The value held by one field of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// The server did not return the field and it has no default.
    #[default]
    Unset,
    /// A scalar, a raw mapping or `null`.
    Value(Value),
    Object(Box<Instance>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            FieldValue::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The value as the server would return it, `None` when unset.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Value(value) => Some(value.clone()),
            FieldValue::Object(instance) => Some(instance.to_json()),
            FieldValue::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }

    fn to_input(&self) -> Option<Value> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Value(value) => Some(value.clone()),
            FieldValue::Object(instance) => Some(Value::Object(instance.to_input())),
            FieldValue::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_input().unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<Instance> for FieldValue {
    fn from(instance: Instance) -> Self {
        FieldValue::Object(Box::new(instance))
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

/// A typed object: the descriptor it was resolved to, its field values in declaration order
/// and the set of fields changed since it was built.
#[derive(Debug, Clone)]
pub struct Instance {
    descriptor: Arc<TypeDescriptor>,
    values: IndexMap<String, FieldValue>,
    changed: IndexSet<String>,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name() == other.descriptor.name()
            && self.values == other.values
            && self.changed == other.changed
    }
}

impl Instance {
    /// An instance with every declared field unset, e.g. to build a mutation input.
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        let values = descriptor
            .fields()
            .map(|field| (field.name().to_string(), FieldValue::Unset))
            .collect();

        Self::with_values(descriptor, values)
    }

    pub(crate) fn with_values(
        descriptor: Arc<TypeDescriptor>,
        values: IndexMap<String, FieldValue>,
    ) -> Self {
        Self {
            descriptor,
            values,
            changed: IndexSet::new(),
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The declared name of the resolved type.
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// The wire typename of the resolved type.
    pub fn typename(&self) -> &str {
        self.descriptor.typename()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Field names and values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Sets a declared field and records it as changed.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), InstanceError> {
        let slot = self
            .values
            .get_mut(field)
            .ok_or_else(|| InstanceError::UnknownField {
                type_name: self.descriptor.name().to_string(),
                field: field.to_string(),
            })?;

        *slot = value.into();
        self.changed.insert(field.to_string());
        Ok(())
    }

    /// Names of the fields changed through [`set`](Self::set), in the order they were first changed.
    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }

    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn clear_changes(&mut self) {
        self.changed.clear();
    }

    /// The changed, mutable and set fields, keyed by their mutation wire names, with each
    /// field's transform applied. This is the input object of an update mutation.
    pub fn changes(&self) -> Map<String, Value> {
        self.descriptor
            .fields()
            .filter(|field| field.is_mutable() && self.changed.contains(field.name()))
            .filter_map(|field| {
                let value = self.values.get(field.name())?.to_input()?;
                Some((
                    field.wire_mutate_name().to_string(),
                    field.serialize_outgoing(value),
                ))
            })
            .collect()
    }

    /// The instance as the server would return it: wire query names plus the discriminator.
    /// Unset fields are left out.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            DISCRIMINATOR.to_string(),
            Value::String(self.typename().to_string()),
        );

        for field in self.descriptor.fields() {
            if let Some(value) = self.values.get(field.name()).and_then(FieldValue::to_json) {
                object.insert(field.wire_query_name().to_string(), value);
            }
        }

        Value::Object(object)
    }

    fn to_input(&self) -> Map<String, Value> {
        self.descriptor
            .fields()
            .filter(|field| field.is_mutable())
            .filter_map(|field| {
                let value = self.values.get(field.name())?.to_input()?;
                Some((
                    field.wire_mutate_name().to_string(),
                    field.serialize_outgoing(value),
                ))
            })
            .collect()
    }
}
