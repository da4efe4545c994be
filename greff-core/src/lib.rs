//! # Greff Core
//!
//! `greff-core` is the foundational library powering the Greff CLI. It lets a caller describe,
//! as data, which fields of which remote GraphQL object types it wants, compiles that
//! description into a query document, and maps the reply back into typed, polymorphism-aware
//! instances.
//!
//! ## Key Components
//!
//! * **[`schema::Registry`]:** Owns every declared [`schema::TypeDescriptor`] and answers lookups
//!   by root name, by wire typename and by declared name. It also holds the implementer maps
//!   used to pick the concrete variant of a polymorphic object.
//! * **[`query::compile`]:** Turns a selection tree ([`query::Selection`]) plus fragments into
//!   canonical query text. Every field set requests the `__typename` discriminator.
//! * **[`response::decode`]:** Turns a decoded JSON payload into [`response::Instance`]s, resolving
//!   the concrete type of each object through the registry.
//! * **[`client::GreffClient`]:** A thin driver that compiles, hands the document to an injected
//!   [`client::Transport`] and decodes the reply.
//!
//! ## Concurrency
//!
//! Declaring types mutates the registry and must finish before the registry is shared. After
//! that it is only read, so an `Arc<Registry>` can be used from any number of threads.
//!
//! ## Re-exports
//!
//! This crate re-exports `serde_json` and `http` so consumers build payloads and transports
//! against compatible versions.
pub mod client;
pub mod query;
pub mod response;
pub mod schema;

// Re-exports
pub use http;
pub use serde_json;

/// The reserved key carrying the concrete variant of every object on the wire.
pub const DISCRIMINATOR: &str = "__typename";

/// Type alias for the standard boxed error used in generic bounds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
