use super::{DecodeError, FieldValue, Instance, Payload};
use crate::{
    DISCRIMINATOR,
    schema::{FieldDescriptor, FieldDefault, Registry, TargetKind, TypeDescriptor, json_kind},
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Decodes a payload against `registry`.
pub fn decode(registry: &Registry, payload: Value) -> Result<QueryResults, DecodeError> {
    ResponseMapper::new(registry).decode(payload)
}

/// Decoded instances grouped by the root field they were returned under, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    groups: Vec<(String, Vec<Instance>)>,
}

impl QueryResults {
    /// The instances returned under `root`.
    pub fn get(&self, root: &str) -> Option<&[Instance]> {
        self.groups
            .iter()
            .find(|(name, _)| name == root)
            .map(|(_, instances)| instances.as_slice())
    }

    pub fn groups(&self) -> &[(String, Vec<Instance>)] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<(String, Vec<Instance>)> {
        self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Walks a decoded payload and instantiates typed objects through a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct ResponseMapper<'r> {
    registry: &'r Registry,
}

impl<'r> ResponseMapper<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Decodes a whole payload.
    ///
    /// # Returns
    ///
    /// * `Ok(QueryResults)` - One group per root field of `data`.
    /// * `Err(DecodeError::RemoteOperationFailed)` - If the payload carries any error, whatever
    ///   `data` holds.
    /// * `Err(DecodeError)` - For the first root, typename or field that does not fit the
    ///   declared types. No partial result is returned.
    pub fn decode(&self, payload: Value) -> Result<QueryResults, DecodeError> {
        if !payload.is_object() {
            return Err(DecodeError::MalformedPayload(format!(
                "expected an object, got {}",
                json_kind(&payload)
            )));
        }

        let payload: Payload = serde_json::from_value(payload)
            .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;

        if let Some(errors) = payload.errors
            && !errors.is_empty()
        {
            return Err(DecodeError::remote(errors));
        }

        let data = match payload.data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(data)) => data,
            Some(other) => {
                return Err(DecodeError::MalformedPayload(format!(
                    "expected `data` to be an object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let mut groups = Vec::with_capacity(data.len());

        for (root, value) in data {
            let base = self
                .registry
                .resolve_by_root_name(&root)
                .ok_or_else(|| DecodeError::UnknownRootName(root.clone()))?;

            let instances = match value {
                Value::Null => Vec::new(),
                Value::Array(items) => items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| self.instantiate(base, item))
                    .collect::<Result<Vec<_>, _>>()?,
                item => vec![self.instantiate(base, item)?],
            };

            groups.push((root, instances));
        }

        Ok(QueryResults { groups })
    }

    /// Instantiates one raw object as `base` or the variant its discriminator names.
    pub fn instantiate(
        &self,
        base: &Arc<TypeDescriptor>,
        value: Value,
    ) -> Result<Instance, DecodeError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(DecodeError::ShapeMismatch {
                    owner: base.name().to_string(),
                    field: DISCRIMINATOR.to_string(),
                    reason: format!("expected an object, got {}", json_kind(&other)),
                });
            }
        };

        let descriptor = match object.remove(DISCRIMINATOR) {
            None | Some(Value::Null) => base.clone(),
            Some(Value::String(typename)) => self.resolve_variant(base, &typename)?,
            Some(other) => {
                return Err(DecodeError::ShapeMismatch {
                    owner: base.name().to_string(),
                    field: DISCRIMINATOR.to_string(),
                    reason: format!("expected a string, got {}", json_kind(&other)),
                });
            }
        };

        let mut values = IndexMap::with_capacity(descriptor.fields().count());

        for field in descriptor.fields() {
            let value = match object.remove(field.wire_query_name()) {
                None => match field.default_value() {
                    FieldDefault::Unset => FieldValue::Unset,
                    FieldDefault::Value(value) => FieldValue::Value(value.clone()),
                },
                Some(raw) => self.map_field(&descriptor, field, raw)?,
            };

            values.insert(field.name().to_string(), value);
        }

        if !object.is_empty() {
            tracing::debug!(
                type_name = descriptor.name(),
                keys = ?object.keys().collect::<Vec<_>>(),
                "ignoring undeclared fields"
            );
        }

        Ok(Instance::with_values(descriptor, values))
    }

    fn resolve_variant(
        &self,
        base: &Arc<TypeDescriptor>,
        typename: &str,
    ) -> Result<Arc<TypeDescriptor>, DecodeError> {
        if typename == base.typename() {
            return Ok(base.clone());
        }

        self.registry
            .resolve_implementer(base, typename)
            .cloned()
            .ok_or_else(|| DecodeError::UnknownDiscriminator {
                base: base.name().to_string(),
                typename: typename.to_string(),
            })
    }

    fn map_field(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        raw: Value,
    ) -> Result<FieldValue, DecodeError> {
        if raw.is_null() {
            return Ok(FieldValue::Value(Value::Null));
        }

        field.validate_value(owner.name(), &raw)?;

        let TargetKind::ObjectReference(type_name) = field.target() else {
            return Ok(FieldValue::Value(raw));
        };

        let target = self
            .registry
            .resolve_by_name(type_name)
            .ok_or_else(|| DecodeError::UnknownType(type_name.clone()))?;

        match raw {
            Value::Array(items) if field.is_collection() => items
                .into_iter()
                .map(|item| match item {
                    Value::Null => Ok(FieldValue::Value(Value::Null)),
                    item => {
                        expect_object(owner, field, &item)?;
                        Ok(FieldValue::from(self.instantiate(target, item)?))
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            raw => {
                expect_object(owner, field, &raw)?;
                Ok(FieldValue::from(self.instantiate(target, raw)?))
            }
        }
    }
}

fn expect_object(
    owner: &TypeDescriptor,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), DecodeError> {
    if value.is_object() {
        return Ok(());
    }

    Err(DecodeError::ShapeMismatch {
        owner: owner.name().to_string(),
        field: field.name().to_string(),
        reason: format!("expected an object, got {}", json_kind(value)),
    })
}
