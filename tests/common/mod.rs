#![allow(dead_code)]

use async_trait::async_trait;
use mousetrap::api::AppState;
use mousetrap::config::{Config, MicetroConfig};
use mousetrap::error::Error;
use mousetrap::micetro::{MicetroService, RpcTransport, COMMENT_TAG};
use mousetrap::token_store::{encode_credential, BearerToken, TokenStore};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fake Micetro answering from fixed zone and record data, recording every call. A `login` is
/// only recorded once `login_delay` has passed.
#[derive(Default)]
pub struct FakeMicetro {
    pub zones: Vec<String>,
    pub records: HashMap<String, Vec<Value>>,
    pub fail: Option<String>,
    pub login_delay: Duration,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl FakeMicetro {
    pub fn with_zones(zones: &[&str]) -> Self {
        Self {
            zones: zones.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn params(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl RpcTransport for FakeMicetro {
    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        if method == "login" && !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if self.fail.as_deref() == Some(method) {
            return Err(Error::BackendProtocol(
                json!({"code": 1, "message": "Access denied"}),
            ));
        }

        Ok(match method {
            "login" => json!({"session": "session-1"}),
            "GetDNSZones" => json!({
                "dnsZones": self.zones.iter().map(|r| json!({"ref": r})).collect::<Vec<_>>()
            }),
            "GetDNSRecords" => {
                let zone_ref = params["dnsZoneRef"].as_str().unwrap_or_default();
                json!({"dnsRecords": self.records.get(zone_ref).cloned().unwrap_or_default()})
            }
            _ => json!({}),
        })
    }
}

pub fn tagged_record(reference: &str) -> Value {
    json!({"ref": reference, "name": "_acme-challenge", "type": "TXT", "comment": COMMENT_TAG})
}

pub fn bearer(secret: &str) -> String {
    format!("Bearer {}", encode_credential(secret))
}

pub fn tokens() -> BTreeMap<String, BearerToken> {
    BTreeMap::from([
        (
            "svc1".to_string(),
            BearerToken {
                token: "T1".to_string(),
                owner: "pki team".to_string(),
                description: "acme client".to_string(),
                permitted_zones: vec!["example.com".to_string()],
                enabled: true,
            },
        ),
        (
            "retired".to_string(),
            BearerToken {
                token: "T2".to_string(),
                owner: "pki team".to_string(),
                description: String::new(),
                permitted_zones: vec!["example.com".to_string()],
                enabled: false,
            },
        ),
    ])
}

pub fn app_state(backend: Arc<FakeMicetro>) -> AppState {
    app_state_with_timeout(backend, Duration::from_secs(5))
}

pub fn app_state_with_timeout(backend: Arc<FakeMicetro>, api_timeout: Duration) -> AppState {
    let micetro = MicetroConfig {
        api_url: "http://micetro.invalid/mmws/json".to_string(),
        server: "micetro.example.com".to_string(),
        login_name: "svc".to_string(),
        password: "pw".to_string(),
        session_cache_ttl: Duration::from_secs(300),
    };
    let config = Config {
        api_bind_addr: "127.0.0.1:0".parse().unwrap(),
        api_timeout,
        micetro: micetro.clone(),
        bearer_tokens: tokens(),
    };
    AppState {
        tokens: TokenStore::new(config.bearer_tokens.clone()).shared(),
        micetro: Arc::new(MicetroService::new(backend, micetro)),
        config: Arc::new(config),
    }
}
