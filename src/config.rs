use crate::error::Error;
use crate::token_store::BearerToken;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub micetro: MicetroConfig,
    #[serde(default)]
    pub bearer_tokens: BTreeMap<String, BearerToken>,
}

/// Connection and login settings for the Micetro JSON-RPC backend.
#[serde_as]
#[derive(Deserialize, Clone)]
pub struct MicetroConfig {
    pub api_url: String,
    pub server: String,
    pub login_name: String,
    pub password: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub session_cache_ttl: Duration,
}

impl fmt::Debug for MicetroConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicetroConfig")
            .field("api_url", &self.api_url)
            .field("server", &self.server)
            .field("login_name", &self.login_name)
            .field("password", &"<REDACTED>")
            .field("session_cache_ttl", &self.session_cache_ttl)
            .finish()
    }
}

impl Config {
    /// Load a [`Config`] from the JSON document at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be read, [`Error::InvalidJSON`] if the document
    /// doesn't deserialize, or [`Error::InvalidConfig`] if a required Micetro setting is empty.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Check the settings that can't be expressed through deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first empty Micetro setting.
    pub fn validate(&self) -> Result<(), Error> {
        if self.micetro.api_url.trim().is_empty() {
            return Err(Error::InvalidConfig("micetro.api_url must not be empty"));
        }
        if self.micetro.server.trim().is_empty() {
            return Err(Error::InvalidConfig("micetro.server must not be empty"));
        }
        if self.micetro.login_name.trim().is_empty() {
            return Err(Error::InvalidConfig("micetro.login_name must not be empty"));
        }
        for (name, token) in &self.bearer_tokens {
            if token.token.is_empty() {
                tracing::warn!("bearer token \"{name}\" has an empty secret and can't be used");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "api_bind_addr": "127.0.0.1:8080",
            "api_timeout": 30,
            "micetro": {
                "api_url": "https://micetro.example.com/mmws/json",
                "server": "micetro.example.com",
                "login_name": "svc-mousetrap",
                "password": "hunter2",
                "session_cache_ttl": 300
            },
            "bearer_tokens": {
                "svc1": {
                    "token": "T1",
                    "owner": "pki team",
                    "permitted_zones": ["example.com"],
                    "enabled": true
                },
                "svc2": { "token": "T2", "owner": "nobody" }
            }
        })
    }

    #[test]
    fn parses_durations_and_token_defaults() {
        let config: Config = serde_json::from_value(sample()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.micetro.session_cache_ttl, Duration::from_secs(300));

        let svc2 = &config.bearer_tokens["svc2"];
        assert!(!svc2.enabled);
        assert!(svc2.permitted_zones.is_empty());
        assert!(svc2.description.is_empty());
    }

    #[test]
    fn rejects_empty_api_url() {
        let mut raw = sample();
        raw["micetro"]["api_url"] = json!("  ");
        let config: Config = serde_json::from_value(raw).unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config: Config = serde_json::from_value(sample()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("\"T1\""));
    }
}
