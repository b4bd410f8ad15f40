//! TXT record reconciliation against Micetro.
use crate::config::MicetroConfig;
use crate::error::Error;
use crate::micetro::rpc::DynRpcTransport;
use crate::micetro::session::SessionManager;
use crate::token_store::Principal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Comment written on every record Mousetrap creates. Removal only ever touches records carrying
/// it.
pub const COMMENT_TAG: &str = "mousetrap";

const PAGE_LIMIT: u32 = 500;

#[allow(clippy::module_name_repetitions)]
pub type SharedMicetroService = Arc<MicetroService>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetDnsZonesParams<'a> {
    filter: String,
    limit: u32,
    offset: u32,
    sort_by: &'a str,
    sort_order: &'a str,
    session: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetDnsRecordsParams<'a> {
    dns_zone_ref: &'a str,
    filter: String,
    include_meta_records: bool,
    limit: u32,
    offset: u32,
    sync_zone: bool,
    session: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DnsRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    ttl: &'a str,
    data: &'a str,
    comment: &'a str,
    enabled: bool,
    dns_zone_ref: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddDnsRecordParams<'a> {
    dns_record: DnsRecord<'a>,
    force_override_of_naming_conflict_check: bool,
    session: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveObjectsParams<'a> {
    obj_refs: &'a [String],
    session: &'a str,
}

#[derive(Deserialize)]
struct ObjectRef {
    #[serde(rename = "ref", default)]
    reference: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DnsZones {
    dns_zones: Vec<ObjectRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DnsRecords {
    dns_records: Vec<ObjectRef>,
}

/// Append the root label separator to `zone` unless it is already there. Missing or empty zones
/// stay `None`.
#[must_use]
pub fn normalize_zone(zone: Option<&str>) -> Option<String> {
    let zone = zone.filter(|zone| !zone.is_empty())?;
    if zone.ends_with('.') {
        Some(zone.to_string())
    } else {
        Some(format!("{zone}."))
    }
}

/// Make `name` relative to the (normalized) `zone` by stripping the zone suffix, if it has one.
/// Names outside the zone come back unchanged. `None` if either input is missing.
#[must_use]
pub fn normalize_name(zone: Option<&str>, name: Option<&str>) -> Option<String> {
    let zone = zone?;
    let name = name.filter(|name| !name.is_empty())?;
    let root = zone.strip_suffix('.').unwrap_or(zone);
    let relative = match name.strip_suffix(root) {
        Some(relative) => relative.strip_suffix('.').unwrap_or(relative),
        None => name,
    };
    Some(relative.to_string())
}

fn normalize(zone: Option<&str>, name: Option<&str>) -> Result<(String, String), Error> {
    let zone = normalize_zone(zone).ok_or(Error::InvalidRequest("missing zone"))?;
    let name = normalize_name(Some(zone.as_str()), name)
        .ok_or(Error::InvalidRequest("missing name"))?;
    // An empty name would turn the record lookup filter into `name=`, matching every name.
    if name.is_empty() {
        return Err(Error::InvalidRequest("name must not be the zone apex"));
    }
    tracing::debug!("zone = '{zone}', name = '{name}'");
    Ok((zone, name))
}

/// Adds and removes Mousetrap-owned TXT records in Micetro on behalf of a [`Principal`].
pub struct MicetroService {
    transport: DynRpcTransport,
    sessions: SessionManager,
}

impl MicetroService {
    #[must_use]
    pub fn new(transport: DynRpcTransport, config: MicetroConfig) -> Self {
        let sessions = SessionManager::new(transport.clone(), config);
        Self {
            transport,
            sessions,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Add a TXT record with `data` at `name` in every Micetro zone matching `zone`.
    ///
    /// A zone the principal isn't permitted for is logged and skipped without error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when `zone`, `name` or `data` is missing, before the
    /// backend is contacted. Backend and transport errors are returned as they occur; records
    /// already added for earlier zones stay in place.
    pub async fn add_txt_records(
        &self,
        principal: &Principal,
        zone: Option<&str>,
        name: Option<&str>,
        data: Option<&str>,
    ) -> Result<(), Error> {
        let (zone, name) = normalize(zone, name)?;
        let data = data.ok_or(Error::InvalidRequest("missing data"))?;
        tracing::info!("ADD: zone={zone}, name={name}");

        if !Self::zone_permitted(principal, &zone) {
            return Ok(());
        }

        let session = self.sessions.get().await?;
        let zone_refs = self.find_zone_refs(&session, &zone).await?;
        tracing::debug!("zone refs {zone_refs:?}");
        for zone_ref in &zone_refs {
            self.add_txt_record(&session, zone_ref, &name, data).await?;
        }
        Ok(())
    }

    /// Remove every Mousetrap-owned TXT record at `name` in the Micetro zones matching `zone`,
    /// using one `RemoveObjects` call for all of them.
    ///
    /// A zone the principal isn't permitted for is logged and skipped without error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when `zone` or `name` is missing, before the backend is
    /// contacted. Backend and transport errors are returned as they occur.
    pub async fn remove_txt_records(
        &self,
        principal: &Principal,
        zone: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), Error> {
        let (zone, name) = normalize(zone, name)?;
        tracing::info!("REMOVE: zone={zone}, name={name}");

        if !Self::zone_permitted(principal, &zone) {
            return Ok(());
        }

        let session = self.sessions.get().await?;
        let zone_refs = self.find_zone_refs(&session, &zone).await?;
        tracing::debug!("zone refs {zone_refs:?}");

        let mut obj_refs = Vec::new();
        for zone_ref in &zone_refs {
            obj_refs.extend(self.find_txt_record_refs(&session, zone_ref, &name).await?);
        }
        tracing::debug!("objRefs={obj_refs:?}");

        if !obj_refs.is_empty() {
            self.remove_objects(&session, &obj_refs).await?;
        }
        Ok(())
    }

    fn zone_permitted(principal: &Principal, zone: &str) -> bool {
        let permitted = principal.zone_permitted(zone);
        if !permitted {
            tracing::warn!(
                "token \"{}\" not permitted to access zone \"{zone}\"",
                principal.name
            );
        }
        permitted
    }

    async fn find_zone_refs(&self, session: &str, zone: &str) -> Result<Vec<String>, Error> {
        let zones: DnsZones = self
            .call(
                "GetDNSZones",
                session,
                GetDnsZonesParams {
                    filter: format!("type=primary name={zone}"),
                    limit: PAGE_LIMIT,
                    offset: 0,
                    sort_by: "natural",
                    sort_order: "Ascending",
                    session,
                },
            )
            .await?;
        Ok(zones
            .dns_zones
            .into_iter()
            .filter_map(|zone| zone.reference)
            .collect())
    }

    async fn find_txt_record_refs(
        &self,
        session: &str,
        zone_ref: &str,
        name: &str,
    ) -> Result<Vec<String>, Error> {
        let records: DnsRecords = self
            .call(
                "GetDNSRecords",
                session,
                GetDnsRecordsParams {
                    dns_zone_ref: zone_ref,
                    filter: format!("type=TXT comment={COMMENT_TAG} name={name}"),
                    include_meta_records: true,
                    limit: PAGE_LIMIT,
                    offset: 0,
                    sync_zone: false,
                    session,
                },
            )
            .await?;
        Ok(records
            .dns_records
            .into_iter()
            .filter(|record| record.comment.as_deref() == Some(COMMENT_TAG))
            .filter_map(|record| record.reference)
            .collect())
    }

    async fn add_txt_record(
        &self,
        session: &str,
        zone_ref: &str,
        name: &str,
        data: &str,
    ) -> Result<(), Error> {
        let result: Value = self
            .call(
                "AddDNSRecord",
                session,
                AddDnsRecordParams {
                    dns_record: DnsRecord {
                        name,
                        record_type: "TXT",
                        ttl: "0",
                        data,
                        comment: COMMENT_TAG,
                        enabled: true,
                        dns_zone_ref: zone_ref,
                    },
                    force_override_of_naming_conflict_check: true,
                    session,
                },
            )
            .await?;
        tracing::debug!("{result}");
        Ok(())
    }

    async fn remove_objects(&self, session: &str, obj_refs: &[String]) -> Result<(), Error> {
        let result: Value = self
            .call(
                "RemoveObjects",
                session,
                RemoveObjectsParams { obj_refs, session },
            )
            .await?;
        tracing::debug!("{result}");
        Ok(())
    }

    /// `params` carry `session`. A backend error drops that session, unless another caller
    /// already replaced it, before the error propagates. The failing operation is not repeated.
    async fn call<P, R>(&self, method: &str, session: &str, params: P) -> Result<R, Error>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        match self.transport.call(method, params).await {
            Ok(result) => Ok(serde_json::from_value(result)?),
            Err(err @ Error::BackendProtocol(_)) => {
                self.sessions.invalidate_session(session).await;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}
