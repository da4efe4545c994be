//! # Query Compilation
//!
//! A query is described as a selection tree ([`Selection`]) built from declared descriptors and
//! compiled into canonical GraphQL text:
//!
//! ```rust
//! use greff_core::query::{Selection, argument, compile};
//! use greff_core::schema::{DeclaredType, TypeDescriptor};
//! use std::sync::Arc;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let book = Arc::new(
//!     TypeDescriptor::builder("Book")
//!         .query_root("book")
//!         .field("title", DeclaredType::Scalar)
//!         .build()?,
//! );
//! let title = book.field("title").cloned().ok_or("missing field")?;
//!
//! let query = compile(
//!     &[Selection::new(argument(book, [("id", "7")]), [title.into()])],
//!     &[],
//! )?;
//!
//! assert_eq!(query, r#"query{book(id:"7"){title,__typename}}"#);
//! # Ok(())
//! # }
//! ```
//!
//! Compilation is purely syntactic: descriptors are not checked against any registry.
mod compiler;
mod selection;

pub use compiler::*;
pub use selection::*;

/// Errors raised while compiling a selection tree.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid query specification: {0}")]
    InvalidQuerySpecification(String),
    #[error("Operation {kind} is not allowed here, expected one of: {}", join_kinds(.allowed))]
    IllegalOperationContext {
        kind: OperationKind,
        allowed: &'static [OperationKind],
    },
}

fn join_kinds(kinds: &[OperationKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
