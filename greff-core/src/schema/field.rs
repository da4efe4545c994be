use super::{DeclarationError, DeclaredType};
use crate::response::DecodeError;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// A function applied to a field value before it is sent to the server.
pub type ValueTransform = Arc<dyn Fn(&FieldDescriptor, Value) -> Value + Send + Sync>;

/// The value a field takes when the server does not return it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldDefault {
    /// No default: the field stays unset on the decoded instance.
    #[default]
    Unset,
    Value(Value),
}

/// What the value of a field is made of, once its declared type has been analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Scalar,
    /// Another declared object type, named by its declared name and resolved through the
    /// registry when a response is decoded.
    ObjectReference(String),
    /// A mapping (or deeper nesting) kept as raw JSON.
    RawMapping,
}

/// Metadata for one declared attribute of a type.
///
/// A descriptor starts unbound: [`bind_name`](Self::bind_name) and
/// [`bind_type`](Self::bind_type) are each called exactly once, in that order, when the owning
/// type is built. Options (wire names, default, transform) are set beforehand with the
/// builder-style methods.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: Option<String>,
    query_name: Option<String>,
    mutate_name: Option<String>,
    default: FieldDefault,
    target: TargetKind,
    type_bound: bool,
    is_collection: bool,
    allows_raw_mapping: bool,
    mutable: bool,
    transform: Option<ValueTransform>,
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldDescriptor {
    pub fn new() -> Self {
        Self {
            name: None,
            query_name: None,
            mutate_name: None,
            default: FieldDefault::Unset,
            target: TargetKind::Scalar,
            type_bound: false,
            is_collection: false,
            allows_raw_mapping: false,
            mutable: true,
            transform: None,
        }
    }

    /// Sets the value used when the server omits this field.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Overrides the name used for this field in query documents and payloads.
    pub fn query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = Some(name.into());
        self
    }

    /// Overrides the name used for this field in mutation inputs.
    pub fn mutate_name(mut self, name: impl Into<String>) -> Self {
        self.mutate_name = Some(name.into());
        self
    }

    /// Whether changes to this field are sent in mutation inputs. Defaults to `true`.
    pub fn mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn transform(
        mut self,
        transform: impl Fn(&FieldDescriptor, Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Binds the declared attribute name. Wire names that were not overridden default to it.
    pub fn bind_name(&mut self, name: impl Into<String>) -> Result<(), DeclarationError> {
        let name = name.into();

        if self.name.is_some() {
            return Err(DeclarationError::FieldAlreadyBound {
                field: name,
                part: "name",
            });
        }
        if self.type_bound {
            return Err(DeclarationError::FieldAlreadyBound {
                field: name,
                part: "type",
            });
        }

        self.query_name.get_or_insert_with(|| name.clone());
        self.mutate_name.get_or_insert_with(|| name.clone());
        self.name = Some(name);
        Ok(())
    }

    /// Analyzes the declared type of the field.
    ///
    /// At most one `List` or `Map` layer is unwrapped; whatever sits below it is terminal.
    /// A terminal that is itself a list or a map is kept as raw JSON.
    pub fn bind_type(&mut self, declared: &DeclaredType) -> Result<(), DeclarationError> {
        if self.type_bound {
            return Err(DeclarationError::FieldAlreadyBound {
                field: self.name().to_string(),
                part: "type",
            });
        }

        self.target = match declared {
            DeclaredType::List(inner) => {
                self.is_collection = true;
                terminal_kind(inner)
            }
            DeclaredType::Map(inner) => {
                self.allows_raw_mapping = true;
                match terminal_kind(inner) {
                    TargetKind::Scalar => TargetKind::RawMapping,
                    kind => kind,
                }
            }
            other => terminal_kind(other),
        };
        self.type_bound = true;
        Ok(())
    }

    /// Checks the shape of a raw value returned by the server for this field.
    pub fn validate_value(&self, owner: &str, value: &Value) -> Result<(), DecodeError> {
        if self.is_collection && !value.is_array() {
            return Err(DecodeError::ShapeMismatch {
                owner: owner.to_string(),
                field: self.name().to_string(),
                reason: format!("expected a list, got {}", json_kind(value)),
            });
        }

        if value.is_object() && !self.accepts_mapping() {
            return Err(DecodeError::ShapeMismatch {
                owner: owner.to_string(),
                field: self.name().to_string(),
                reason: "got an object, but the field neither accepts raw mappings nor references an object type".to_string(),
            });
        }

        Ok(())
    }

    /// Prepares a value to be sent to the server.
    pub fn serialize_outgoing(&self, value: Value) -> Value {
        match &self.transform {
            Some(transform) => transform(self, value),
            None => value,
        }
    }

    /// The declared attribute name, empty until bound.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn wire_query_name(&self) -> &str {
        self.query_name.as_deref().unwrap_or_default()
    }

    pub fn wire_mutate_name(&self) -> &str {
        self.mutate_name.as_deref().unwrap_or_default()
    }

    pub fn default_value(&self) -> &FieldDefault {
        &self.default
    }

    pub fn target(&self) -> &TargetKind {
        &self.target
    }

    /// The declared name of the referenced object type, if any.
    pub fn referenced_type(&self) -> Option<&str> {
        match &self.target {
            TargetKind::ObjectReference(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn is_bound(&self) -> bool {
        self.name.is_some() && self.type_bound
    }

    fn accepts_mapping(&self) -> bool {
        self.allows_raw_mapping || !matches!(self.target, TargetKind::Scalar)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("query_name", &self.query_name)
            .field("mutate_name", &self.mutate_name)
            .field("default", &self.default)
            .field("target", &self.target)
            .field("is_collection", &self.is_collection)
            .field("allows_raw_mapping", &self.allows_raw_mapping)
            .field("mutable", &self.mutable)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

fn terminal_kind(declared: &DeclaredType) -> TargetKind {
    match declared {
        DeclaredType::Scalar => TargetKind::Scalar,
        DeclaredType::Object(name) => TargetKind::ObjectReference(name.clone()),
        DeclaredType::List(_) | DeclaredType::Map(_) => TargetKind::RawMapping,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
