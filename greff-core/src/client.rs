//! # Greff Client
//!
//! This module drives a full round-trip: compile a selection tree, hand the document to a
//! [`Transport`], and decode the reply into typed instances.
//!
//! The client does not own any networking. It builds a standard `http::Request` carrying the
//! GraphQL JSON body and lets the transport deliver it, so any HTTP stack (or an in-memory fake
//! in tests) can sit underneath. Retries, pooling and timeouts belong to the transport.
//!
//! ## Error Handling
//!
//! - **[`ClientError::Query`] / [`ClientError::Decode`]**: The document could not be built, or
//!   the reply does not fit the declared types.
//! - **[`ClientError::Transport`]**: The transport failed to deliver the request.
//! - **[`DecodeError::RemoteOperationFailed`]**: The server answered with a GraphQL `errors` list
//!   (surfaced through [`ClientError::Decode`]).
use crate::{
    BoxError,
    query::{self, Fragment, QueryError, Selection},
    response::{self, DecodeError, QueryResults},
    schema::Registry,
};
use http::{
    HeaderName, HeaderValue, Method, Request, Response, Uri,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::Serialize;
use std::{future::Future, str::FromStr, sync::Arc};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL '{url}': '{source}'")]
    InvalidUri {
        url: String,
        source: http::uri::InvalidUri,
    },
    #[error("Invalid header '{key}': '{source}'")]
    InvalidHeader {
        key: String,
        #[source]
        source: http::Error,
    },
    #[error("Failed to build the query document: '{0}'")]
    Query(#[from] QueryError),
    #[error("Failed to encode the request body: '{0}'")]
    EncodeRequest(#[source] serde_json::Error),
    #[error("Transport failed: '{0}'")]
    Transport(#[source] BoxError),
    #[error("Server answered with status {status} and a body that is not JSON: '{source}'")]
    InvalidResponseBody {
        status: http::StatusCode,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Delivers an HTTP request to a GraphQL endpoint and returns the raw reply.
pub trait Transport {
    type Error: Into<BoxError>;

    fn send(
        &mut self,
        request: Request<Vec<u8>>,
    ) -> impl Future<Output = Result<Response<Vec<u8>>, Self::Error>> + Send;
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
}

/// A GraphQL client bound to one endpoint and one registry.
#[derive(Debug, Clone)]
pub struct GreffClient<T> {
    transport: T,
    endpoint: Uri,
    headers: Vec<(HeaderName, HeaderValue)>,
    registry: Arc<Registry>,
}

impl<T> GreffClient<T>
where
    T: Transport,
{
    /// Creates a client for `url`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Delivers the requests.
    /// * `url` - The GraphQL endpoint (e.g. `https://api.example.com/graphql`).
    /// * `registry` - The declared types, shared with the caller. Declarations must be done.
    ///
    /// # Returns
    ///
    /// * `Ok(GreffClient)` - The client.
    /// * `Err(ClientError::InvalidUri)` - If `url` cannot be parsed.
    pub fn new(transport: T, url: &str, registry: Arc<Registry>) -> Result<Self, ClientError> {
        let endpoint = Uri::from_str(url).map_err(|source| ClientError::InvalidUri {
            url: url.to_string(),
            source,
        })?;

        Ok(Self {
            transport,
            endpoint,
            headers: Vec::new(),
            registry,
        })
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, ClientError> {
        let invalid = |source: http::Error| ClientError::InvalidHeader {
            key: key.to_string(),
            source,
        };

        let name = HeaderName::from_str(key).map_err(|e| invalid(e.into()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.into()))?;

        self.headers.push((name, value));
        Ok(self)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Compiles and runs a query.
    pub async fn query(
        &mut self,
        selections: &[Selection],
        fragments: &[Fragment],
    ) -> Result<QueryResults, ClientError> {
        let document = query::compile(selections, fragments)?;
        self.execute(&document).await
    }

    /// Compiles and runs a mutation.
    pub async fn mutate(
        &mut self,
        selections: &[Selection],
        fragments: &[Fragment],
    ) -> Result<QueryResults, ClientError> {
        let document = query::compile_mutation(selections, fragments)?;
        self.execute(&document).await
    }

    /// Sends an already compiled document and decodes the reply.
    pub async fn execute(&mut self, document: &str) -> Result<QueryResults, ClientError> {
        let request = self.build_request(document)?;

        tracing::debug!(endpoint = %self.endpoint, "sending GraphQL document");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ClientError::Transport(e.into()))?;

        let status = response.status();
        tracing::debug!(%status, "received GraphQL response");

        let payload: serde_json::Value = serde_json::from_slice(response.body())
            .map_err(|source| ClientError::InvalidResponseBody { status, source })?;

        Ok(response::decode(&self.registry, payload)?)
    }

    fn build_request(&self, document: &str) -> Result<Request<Vec<u8>>, ClientError> {
        let body = serde_json::to_vec(&RequestBody { query: document })
            .map_err(ClientError::EncodeRequest)?;

        let mut request = Request::new(body);
        *request.method_mut() = Method::POST;
        *request.uri_mut() = self.endpoint.clone();

        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }

        Ok(request)
    }
}
