use serde::Deserialize;

/// Body of `POST /api/v1/micetro`. Every field is optional at this level so that a missing one
/// is reported by name, e.g. `missing zone`.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct AddRecordRequest {
    pub zone: Option<String>,
    pub name: Option<String>,
    pub data: Option<String>,
}

/// Body of `DELETE /api/v1/micetro`.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct RemoveRecordRequest {
    pub zone: Option<String>,
    pub name: Option<String>,
}
