//! # Schema Documents
//!
//! Declares a whole schema from JSON, so types don't have to be built in code.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Author", "fields": [{ "name": "name" }] },
//!     {
//!       "name": "Media",
//!       "query_root": "media",
//!       "fields": [
//!         { "name": "title" },
//!         { "name": "authors", "type": { "list": { "object": "Author" } }, "default": [] }
//!       ]
//!     },
//!     { "name": "Book", "extends": "Media", "fields": [{ "name": "isbn", "mutable": false }] }
//!   ]
//! }
//! ```
//!
//! Types are declared in document order, so a parent must appear before the types extending
//! it. `implements` lists are applied once every type is declared and may name types that
//! appear later in the document.
use super::{DeclarationError, DeclaredType, FieldDescriptor, Registry, TypeDescriptor};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to parse schema document: '{0}'")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to declare type '{type_name}': '{source}'")]
    Declaration {
        type_name: String,
        #[source]
        source: DeclarationError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub types: Vec<TypeDeclaration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub typename: Option<String>,
    #[serde(default)]
    pub query_root: String,
    #[serde(default)]
    pub mutate_root: String,
    #[serde(default)]
    pub extends: Option<String>,
    /// Declared names of the concrete types that also satisfy this one.
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type", default = "scalar")]
    pub declared: DeclaredType,
    #[serde(default)]
    pub query_name: Option<String>,
    #[serde(default)]
    pub mutate_name: Option<String>,
    /// A `null` default is the same as no default.
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default = "enabled")]
    pub mutable: bool,
}

fn scalar() -> DeclaredType {
    DeclaredType::Scalar
}

fn enabled() -> bool {
    true
}

impl SchemaDocument {
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Declares every type of the document into a fresh registry.
    pub fn into_registry(self) -> Result<Registry, DocumentError> {
        let mut registry = Registry::new();
        self.declare_into(&mut registry)?;
        Ok(registry)
    }

    /// Declares every type of the document into `registry`.
    pub fn declare_into(self, registry: &mut Registry) -> Result<(), DocumentError> {
        let mut explicit_implementers = Vec::new();

        for declaration in self.types {
            let type_name = declaration.name.clone();

            if !declaration.implements.is_empty() {
                explicit_implementers.push((type_name.clone(), declaration.implements.clone()));
            }

            registry
                .declare(declaration.into_builder())
                .map_err(|source| DocumentError::Declaration { type_name, source })?;
        }

        for (base_name, concrete_names) in explicit_implementers {
            let declaration_error = |source| DocumentError::Declaration {
                type_name: base_name.clone(),
                source,
            };

            let base = registry
                .resolve_by_name(&base_name)
                .cloned()
                .ok_or_else(|| declaration_error(DeclarationError::UnknownType(base_name.clone())))?;

            for concrete_name in concrete_names {
                let concrete = registry
                    .resolve_by_name(&concrete_name)
                    .cloned()
                    .ok_or_else(|| declaration_error(DeclarationError::UnknownType(concrete_name)))?;

                registry
                    .register_implementer(&base, concrete.typename(), &concrete)
                    .map_err(&declaration_error)?;
            }
        }

        Ok(())
    }
}

impl TypeDeclaration {
    fn into_builder(self) -> super::TypeBuilder {
        let mut builder = TypeDescriptor::builder(self.name)
            .query_root(self.query_root)
            .mutate_root(self.mutate_root);

        if let Some(typename) = self.typename {
            builder = builder.typename(typename);
        }
        if let Some(parent) = self.extends {
            builder = builder.extends(parent);
        }

        for field in self.fields {
            let mut descriptor = FieldDescriptor::new().mutable(field.mutable);

            if let Some(name) = field.query_name {
                descriptor = descriptor.query_name(name);
            }
            if let Some(name) = field.mutate_name {
                descriptor = descriptor.mutate_name(name);
            }
            if let Some(default) = field.default {
                descriptor = descriptor.with_default(default);
            }

            builder = builder.field_with(field.name, field.declared, descriptor);
        }

        builder
    }
}
