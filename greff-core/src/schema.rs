//! # Schema Declarations
//!
//! This module holds the metadata both the query compiler and the response mapper work from.
//!
//! * [`FieldDescriptor`]: one declared attribute of a type (wire names, default, referenced type).
//! * [`TypeDescriptor`]: one declared remote object type, built through [`TypeBuilder`].
//! * [`Registry`]: the lookup tables and the implementer maps for polymorphic decoding.
//! * [`document`]: declaring a whole schema from a JSON document.
//!
//! ## Example
//!
//! ```rust
//! use greff_core::schema::{DeclaredType, Registry, TypeDescriptor};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//!
//! let media = registry.declare(
//!     TypeDescriptor::builder("Media")
//!         .query_root("media")
//!         .field("title", DeclaredType::Scalar),
//! )?;
//!
//! let book = registry.declare(
//!     TypeDescriptor::builder("Book")
//!         .extends("Media")
//!         .field("title", DeclaredType::Scalar)
//!         .field("authors", DeclaredType::list(DeclaredType::object("Author"))),
//! )?;
//!
//! assert_eq!(book.typename(), "Book");
//! assert!(registry.resolve_implementer(&media, "Book").is_some());
//! # Ok(())
//! # }
//! ```
pub mod document;
mod field;
mod registry;
mod types;

pub use field::*;
pub use registry::*;
pub use types::*;

/// Errors raised while declaring types. They abort the declaration that caused them and leave
/// the registry as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("Duplicate registration of {kind} '{name}'")]
    DuplicateRegistration { kind: &'static str, name: String },
    #[error("Field '{field}' already has its {part} bound")]
    FieldAlreadyBound { field: String, part: &'static str },
    #[error("Type '{type_name}' declares field '{field}' more than once")]
    DuplicateField { type_name: String, field: String },
    #[error("Type '{type_name}' cannot declare the reserved field '{field}'")]
    ReservedFieldName { type_name: String, field: String },
    #[error("Type '{0}' is not declared")]
    UnknownType(String),
}
