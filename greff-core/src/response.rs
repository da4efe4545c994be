//! # Response Mapping
//!
//! Turns a decoded GraphQL payload into typed [`Instance`]s.
//!
//! Every object is instantiated as the concrete variant named by its `__typename`, looked up in
//! the implementer map of the type the field (or root) was declared with. Fields are filled in
//! declaration order, so the result does not depend on the order keys arrived in.
//!
//! A payload carrying errors produces no instances at all; neither does a payload that fails to
//! decode halfway through.
mod instance;
mod mapper;
mod payload;

pub use instance::*;
pub use mapper::*;
pub use payload::*;

/// Errors raised while decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{message}")]
    RemoteOperationFailed {
        errors: Vec<RemoteError>,
        /// Every error message, one per line.
        message: String,
    },
    #[error("Root field '{0}' does not belong to any declared type")]
    UnknownRootName(String),
    #[error("The server returned unknown typename '{typename}' for type '{base}'")]
    UnknownDiscriminator { base: String, typename: String },
    #[error("Shape mismatch on '{owner}.{field}': {reason}")]
    ShapeMismatch {
        owner: String,
        field: String,
        reason: String,
    },
    #[error("Type '{0}' is referenced but not declared")]
    UnknownType(String),
    #[error("Malformed payload: '{0}'")]
    MalformedPayload(String),
}

impl DecodeError {
    pub(crate) fn remote(errors: Vec<RemoteError>) -> Self {
        let message = errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        DecodeError::RemoteOperationFailed { errors, message }
    }
}
