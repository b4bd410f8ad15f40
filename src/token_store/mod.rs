//! Static bearer token storage.
//!
//! Tokens are read once from the [`Config::bearer_tokens`][crate::config::Config::bearer_tokens]
//! map and never change afterwards. A [`TokenStore`] holds those tokens together with a reverse
//! index from secret value to token name, which is what inbound credentials are resolved
//! against.
//!
//! Clients present a token as `Authorization: Bearer <credential>`, where `<credential>` is the
//! standard BASE64 encoding of the configured secret. Presenting the raw secret does not
//! authenticate.
//!
//! Reloading the configuration builds a fresh [`TokenStore`] and swaps it in as a whole, see
//! [`SharedTokenStore`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

const BEARER_PREFIX: &str = "Bearer ";

/// `SharedTokenStore` is the swappable handle to the active [`TokenStore`]. Readers clone the
/// inner [`Arc`] and release the lock straight away, a reload replaces the inner [`Arc`].
#[allow(clippy::module_name_repetitions)]
pub type SharedTokenStore = Arc<RwLock<Arc<TokenStore>>>;

/// A named bearer token as configured. The name is the key of the
/// [`Config::bearer_tokens`][crate::config::Config::bearer_tokens] map.
#[derive(Deserialize, Clone, Default)]
pub struct BearerToken {
    pub token: String,
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permitted_zones: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<REDACTED>")
            .field("owner", &self.owner)
            .field("description", &self.description)
            .field("permitted_zones", &self.permitted_zones)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// The identity a request was authenticated as. Lives in the extensions of a single request and
/// is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub owner: String,
    pub permitted_zones: Vec<String>,
}

impl Principal {
    /// Whether this principal may manage records in `zone`.
    ///
    /// Zones compare case-insensitively and regardless of a trailing `.`, but otherwise must be
    /// equal: a token permitted for `example.com` is not permitted for `sub.example.com`.
    #[must_use]
    pub fn zone_permitted(&self, zone: &str) -> bool {
        let zone = zone.strip_suffix('.').unwrap_or(zone);
        self.permitted_zones.iter().any(|permitted| {
            let permitted = permitted.strip_suffix('.').unwrap_or(permitted);
            permitted.eq_ignore_ascii_case(zone)
        })
    }
}

/// Immutable set of configured [`BearerToken`]s plus the secret to name reverse index.
#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct TokenStore {
    tokens: BTreeMap<String, BearerToken>,
    index: HashMap<String, String>,
}

impl TokenStore {
    /// Build the store and its reverse index. When two tokens share a secret the one whose name
    /// sorts first owns it. Tokens with an empty secret are not indexed.
    #[must_use]
    pub fn new(tokens: BTreeMap<String, BearerToken>) -> Self {
        let mut index = HashMap::with_capacity(tokens.len());
        for (name, token) in &tokens {
            if token.token.is_empty() {
                continue;
            }
            index
                .entry(token.token.clone())
                .or_insert_with(|| name.clone());
        }
        Self { tokens, index }
    }

    #[must_use]
    pub fn shared(self) -> SharedTokenStore {
        Arc::new(RwLock::new(Arc::new(self)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Resolve a raw secret to the [`Principal`] of the enabled token it belongs to.
    #[must_use]
    pub fn resolve(&self, secret: &str) -> Option<Principal> {
        if secret.is_empty() {
            return None;
        }
        let name = self.index.get(secret)?;
        let token = self.tokens.get(name)?;
        if !token.enabled {
            tracing::debug!("bearer token \"{name}\" is disabled");
            return None;
        }
        Some(Principal {
            name: name.clone(),
            owner: token.owner.clone(),
            permitted_zones: token.permitted_zones.clone(),
        })
    }

    /// Resolve the value of an `Authorization` header. Anything that isn't a `Bearer` credential
    /// holding the BASE64 encoding of a known, enabled secret resolves to `None`.
    #[must_use]
    pub fn resolve_header(&self, header: &str) -> Option<Principal> {
        let secret = decode_credential(header.strip_prefix(BEARER_PREFIX)?)?;
        self.resolve(&secret)
    }
}

/// Decode a bearer credential the way the token tooling encodes secrets: standard BASE64 of the
/// UTF-8 secret.
#[must_use]
pub fn decode_credential(credential: &str) -> Option<String> {
    let raw = BASE64.decode(credential.trim()).ok()?;
    String::from_utf8(raw).ok()
}

/// Encode a secret into the credential form clients send.
#[must_use]
pub fn encode_credential(secret: &str) -> String {
    BASE64.encode(secret)
}
