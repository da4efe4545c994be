use super::{DeclarationError, FieldDescriptor};
use crate::DISCRIMINATOR;
use indexmap::{IndexMap, map::Entry};
use serde::Deserialize;
use std::{collections::HashSet, sync::Arc};

/// The declared type of a field, as written in a type declaration.
///
/// In schema documents this is written as `"scalar"`, `{"object": "Author"}`,
/// `{"list": ...}` or `{"map": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Scalar,
    Object(String),
    List(Box<DeclaredType>),
    Map(Box<DeclaredType>),
}

impl DeclaredType {
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    pub fn list(inner: DeclaredType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn map(inner: DeclaredType) -> Self {
        Self::Map(Box::new(inner))
    }
}

/// Metadata for one declared remote object type.
///
/// Descriptors are immutable once built. The polymorphic relations between types live in the
/// [`Registry`](super::Registry), not here.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    typename: String,
    query_root: String,
    mutate_root: String,
    parent: Option<String>,
    fields: IndexMap<String, Arc<FieldDescriptor>>,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name)
    }

    /// The declared name (e.g. `Book`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire discriminator the server returns for this type.
    pub fn typename(&self) -> &str {
        &self.typename
    }

    /// The root query field for this type, if it can be queried directly.
    pub fn query_root_name(&self) -> Option<&str> {
        Some(self.query_root.as_str()).filter(|root| !root.is_empty())
    }

    /// The root mutation field for this type, if it can be mutated directly.
    pub fn mutate_root_name(&self) -> Option<&str> {
        Some(self.mutate_root.as_str()).filter(|root| !root.is_empty())
    }

    /// The declared name of the type this one extends.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(name)
    }
}

/// Collects the declaration of a type and builds its [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    typename: Option<String>,
    query_root: String,
    mutate_root: String,
    parent: Option<String>,
    fields: Vec<(String, DeclaredType, FieldDescriptor)>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typename: None,
            query_root: String::new(),
            mutate_root: String::new(),
            parent: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the wire discriminator. Defaults to the title-cased declared name.
    pub fn typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = Some(typename.into());
        self
    }

    pub fn query_root(mut self, root: impl Into<String>) -> Self {
        self.query_root = root.into();
        self
    }

    pub fn mutate_root(mut self, root: impl Into<String>) -> Self {
        self.mutate_root = root.into();
        self
    }

    /// Declares this type as a variant of an already declared type.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.field_with(name, declared, FieldDescriptor::new())
    }

    pub fn field_with(
        mut self,
        name: impl Into<String>,
        declared: DeclaredType,
        field: FieldDescriptor,
    ) -> Self {
        self.fields.push((name.into(), declared, field));
        self
    }

    pub(crate) fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Binds every field and builds the immutable descriptor.
    pub fn build(self) -> Result<TypeDescriptor, DeclarationError> {
        let typename = self.typename.unwrap_or_else(|| title_case(&self.name));
        let mut fields = IndexMap::with_capacity(self.fields.len());
        let mut wire_names = HashSet::with_capacity(self.fields.len());

        for (field_name, declared, mut field) in self.fields {
            field.bind_name(field_name.as_str())?;
            field.bind_type(&declared)?;

            if field_name == DISCRIMINATOR || field.wire_query_name() == DISCRIMINATOR {
                return Err(DeclarationError::ReservedFieldName {
                    type_name: self.name,
                    field: field_name,
                });
            }

            // Decoding reads each wire key once, so two fields cannot share one.
            if !wire_names.insert(field.wire_query_name().to_string()) {
                return Err(DeclarationError::DuplicateField {
                    type_name: self.name,
                    field: field_name,
                });
            }

            match fields.entry(field_name) {
                Entry::Occupied(entry) => {
                    return Err(DeclarationError::DuplicateField {
                        type_name: self.name,
                        field: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(field));
                }
            }
        }

        Ok(TypeDescriptor {
            name: self.name,
            typename,
            query_root: self.query_root,
            mutate_root: self.mutate_root,
            parent: self.parent,
            fields,
        })
    }
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest,
/// so `book_item` becomes `Book_Item` and `BookItem` becomes `Bookitem`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
