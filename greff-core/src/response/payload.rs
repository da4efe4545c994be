use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The JSON body returned by a GraphQL endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<RemoteError>>,
}

/// An error reported by the server in the `errors` list of a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
    /// Servers send either no key, `null` or a list.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

/// A position in the query document an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Location>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Location>>::deserialize(deserializer)?.unwrap_or_default())
}
