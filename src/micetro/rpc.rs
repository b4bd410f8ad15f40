//! JSON-RPC transport to the Micetro web service.
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// `DynRpcTransport` is a type alias for an [`RpcTransport`] shared by the session manager and
/// the reconciliation service.
pub type DynRpcTransport = Arc<dyn RpcTransport + Send + Sync>;

/// An async trait describing a single JSON-RPC method call against Micetro.
#[async_trait::async_trait]
pub trait RpcTransport {
    /// Call `method` with `params`, returning the response `result` (`Value::Null` when absent).
    ///
    /// Fails with [`Error::BackendProtocol`] when the response carries an `error` payload, and
    /// with [`Error::Transport`] when the exchange itself fails.
    async fn call(&self, method: &str, params: Value) -> Result<Value, Error>;
}

#[derive(Serialize, Debug)]
pub(crate) struct RpcRequest<'a> {
    pub method: &'a str,
    pub params: &'a Value,
    pub id: u64,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Option<u64>,
}

impl RpcResponse {
    pub(crate) fn into_result(self) -> Result<Value, Error> {
        match self.error {
            Some(error) if !error.is_null() => Err(Error::BackendProtocol(error)),
            _ => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Request ids shared by every call made through one transport. The first id is 1 and ids are
/// never reused.
#[derive(Debug, Default)]
pub(crate) struct RequestIds(AtomicU64);

impl RequestIds {
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// [`RpcTransport`] over HTTPS `POST` to the configured Micetro endpoint.
#[derive(Debug)]
pub struct HttpRpcClient {
    api_url: String,
    client: reqwest::Client,
    ids: RequestIds,
}

impl HttpRpcClient {
    /// Create a client for the JSON-RPC endpoint at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client can't be initialised.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            api_url: api_url.into(),
            client: reqwest::Client::builder().build()?,
            ids: RequestIds::default(),
        })
    }
}

#[async_trait::async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let request = RpcRequest {
            method,
            params: &params,
            id: self.ids.next(),
        };
        tracing::trace!("rpc request method={} id={}", request.method, request.id);

        let response: RpcResponse = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::trace!("rpc response id={:?}", response.id);
        response.into_result()
    }
}
