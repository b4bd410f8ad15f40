//! Micetro DNS management backend.
//!
//! Micetro is only reachable through its JSON-RPC web service. Every call is a `POST` of
//!
//! ```json
//! { "method": "GetDNSZones", "params": { ... }, "id": 1 }
//! ```
//!
//! answered by
//!
//! ```json
//! { "result": { ... }, "error": null, "id": 1 }
//! ```
//!
//! Three layers sit on top of each other:
//!
//! - [`rpc`]: the [`RpcTransport`] trait and its HTTP implementation [`HttpRpcClient`].
//! - [`session`]: the [`SessionManager`] caching the session id returned by `login`.
//! - [`service`]: the [`MicetroService`] adding and removing TXT records, scoped to the zones a
//!   [`Principal`][crate::token_store::Principal] is permitted for.
//!
//! Records created by Mousetrap carry the comment [`COMMENT_TAG`]. Removal only ever selects
//! records with that comment, records created by other means are left alone.

pub mod rpc;
pub mod service;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use rpc::{DynRpcTransport, HttpRpcClient, RpcTransport};
pub use service::{
    normalize_name, normalize_zone, MicetroService, SharedMicetroService, COMMENT_TAG,
};
pub use session::SessionManager;
