//! Cached Micetro login session.
use crate::config::MicetroConfig;
use crate::error::Error;
use crate::micetro::rpc::DynRpcTransport;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LoginParams<'a> {
    server: &'a str,
    login_name: &'a str,
    password: &'a str,
    unauthorized_as_forbidden: bool,
}

#[derive(Deserialize)]
struct LoginResult {
    session: String,
}

struct CachedSession {
    id: String,
    expires_at: Instant,
}

/// Holds the one Micetro session shared by every request.
///
/// The session is obtained through the `login` method on first use and reused until
/// `session_cache_ttl` has passed since it was obtained, or until [`SessionManager::invalidate`]
/// is called. Callers that find the slot empty at the same time share a single login call.
pub struct SessionManager {
    transport: DynRpcTransport,
    config: MicetroConfig,
    slot: RwLock<Option<CachedSession>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(transport: DynRpcTransport, config: MicetroConfig) -> Self {
        Self {
            transport,
            config,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached session id, logging in first if there is none or it expired.
    ///
    /// # Errors
    ///
    /// Returns whatever error the `login` call fails with. Nothing is cached in that case.
    pub async fn get(&self) -> Result<String, Error> {
        if let Some(id) = Self::fresh(&*self.slot.read().await) {
            return Ok(id);
        }

        let mut slot = self.slot.write().await;
        // Another caller may have logged in while we waited for the write lock.
        if let Some(id) = Self::fresh(&slot) {
            return Ok(id);
        }

        tracing::debug!("login - session cache miss");
        let id = self.login().await?;
        *slot = Some(CachedSession {
            id: id.clone(),
            expires_at: Instant::now() + self.config.session_cache_ttl,
        });
        Ok(id)
    }

    /// Drop the cached session so the next [`SessionManager::get`] logs in again.
    pub async fn invalidate(&self) {
        if self.slot.write().await.take().is_some() {
            tracing::debug!("session invalidated");
        }
    }

    /// Drop the cached session only if it is still `id`. A failure reported for a session that
    /// has since been replaced leaves the newer one in place.
    pub async fn invalidate_session(&self, id: &str) {
        let mut slot = self.slot.write().await;
        if slot.as_ref().is_some_and(|session| session.id == id) {
            *slot = None;
            tracing::debug!("session invalidated");
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.config.session_cache_ttl
    }

    fn fresh(slot: &Option<CachedSession>) -> Option<String> {
        slot.as_ref()
            .filter(|session| Instant::now() < session.expires_at)
            .map(|session| session.id.clone())
    }

    async fn login(&self) -> Result<String, Error> {
        let params = serde_json::to_value(LoginParams {
            server: &self.config.server,
            login_name: &self.config.login_name,
            password: &self.config.password,
            unauthorized_as_forbidden: true,
        })?;
        let result = self.transport.call("login", params).await?;
        let LoginResult { session } = serde_json::from_value(result)?;
        Ok(session)
    }
}
