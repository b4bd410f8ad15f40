//! HTTP API for adding and removing ACME challenge TXT records in Micetro.
//!
//! # Authentication
//!
//! Clients authenticate with a static bearer token from the
//! [`Config::bearer_tokens`][crate::config::Config::bearer_tokens] map:
//!
//! ```text
//! Authorization: Bearer <BASE64 of the configured token secret>
//! ```
//!
//! A missing, malformed, unknown or disabled token leaves the request unauthenticated. Only the
//! `/api/v1/micetro` endpoints require authentication, and answer HTTP 401 (Unauthorized)
//! without it.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/api/v1/micetro` (POST)
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   { "zone": "example.com", "name": "_acme-challenge.example.com", "data": "XXXX" }
//!   ```
//!
//!   Adds a TXT record holding `data` at `name` to every primary Micetro zone matching `zone`.
//!   `name` may be given relative to the zone or fully qualified within it. The record is
//!   tagged with [`COMMENT_TAG`][crate::micetro::COMMENT_TAG] so it can be removed later.
//!
//!   Returns HTTP 200 (OK) with the body `OK\n`. A zone the token isn't permitted for also
//!   returns HTTP 200 (OK), without touching Micetro. A missing `zone`, `name` or `data`
//!   returns HTTP 400 (Bad Request).
//!
//! ## `/api/v1/micetro` (DELETE)
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   { "zone": "example.com", "name": "_acme-challenge.example.com" }
//!   ```
//!
//!   Removes the tagged TXT records at `name` from every primary Micetro zone matching `zone`.
//!   Records without the tag are never removed. Responses are the same as for `POST`.
//!
//! Micetro errors are returned as HTTP 500 (Internal Server Error).

mod api_error;
mod auth;
mod model;
mod routes;
pub mod server;

pub use routes::new as router;
pub use server::{new, AppState};
