//! Mousetrap
//!
//! A small REST service letting ACME clients solve [RFC-8555][RFC-8555] [DNS-01] challenges for
//! zones hosted in a [Micetro] DNS manager.
//!
//! Clients authenticate with static bearer tokens, each permitted for a fixed set of zones.
//! Challenge TXT records are created and removed through Micetro's JSON-RPC web service, and
//! are tagged so that Mousetrap never removes records it didn't create.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//! [Micetro]: https://bluecatnetworks.com/micetro/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod micetro;
pub mod token_store;

pub use api::new as new_http;
pub use config::{Config, MicetroConfig, SharedConfig};
pub use micetro::{HttpRpcClient, MicetroService};
pub use token_store::{Principal, TokenStore};
