//! In-memory [`RpcTransport`] for unit tests.
use crate::error::Error;
use crate::micetro::rpc::RpcTransport;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Answers Micetro methods from fixed data and records every call it receives.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    /// Zone refs returned by `GetDNSZones`.
    pub zones: Vec<String>,
    /// Record objects returned by `GetDNSRecords`, keyed by zone ref.
    pub records: HashMap<String, Vec<Value>>,
    pub login_delay: Duration,
    /// A method that answers with the given error payload.
    pub fail: Option<(String, Value)>,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedBackend {
    pub(crate) fn failing(method: &str, payload: Value) -> Self {
        Self {
            fail: Some((method.to_string(), payload)),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub(crate) fn params(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl RpcTransport for ScriptedBackend {
    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let logins = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((method.to_string(), params.clone()));
            calls.iter().filter(|(m, _)| m == "login").count()
        };

        if let Some((failing, payload)) = &self.fail {
            if failing == method {
                return Err(Error::BackendProtocol(payload.clone()));
            }
        }

        match method {
            "login" => {
                if !self.login_delay.is_zero() {
                    tokio::time::sleep(self.login_delay).await;
                }
                Ok(json!({ "session": format!("session-{logins}") }))
            }
            "GetDNSZones" => Ok(json!({
                "dnsZones": self.zones.iter().map(|r| json!({ "ref": r })).collect::<Vec<_>>(),
                "totalResults": self.zones.len(),
            })),
            "GetDNSRecords" => {
                let zone_ref = params["dnsZoneRef"].as_str().unwrap_or_default();
                let records = self.records.get(zone_ref).cloned().unwrap_or_default();
                Ok(json!({ "totalResults": records.len(), "dnsRecords": records }))
            }
            "AddDNSRecord" => Ok(json!({ "objRef": "dnsRecords/new" })),
            "RemoveObjects" => Ok(json!({})),
            other => Err(Error::BackendProtocol(
                json!({ "code": -32601, "message": format!("unknown method {other}") }),
            )),
        }
    }
}
