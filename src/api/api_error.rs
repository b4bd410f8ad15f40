use crate::error::Error;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let status = match any_err.downcast_ref::<Error>() {
            Some(Error::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Some(Error::AuthenticationRequired) => StatusCode::UNAUTHORIZED,
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
            None => any_err
                .downcast_ref::<JsonRejection>()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, json_rejection_status),
        };
        if status.is_server_error() {
            tracing::error!("request failed: {any_err:#}");
        }
        let body = Json(json!({
            "error": format!("{any_err}"),
        }));
        (status, body).into_response()
    }
}

fn json_rejection_status(err: &JsonRejection) -> StatusCode {
    match err {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            StatusCode::BAD_REQUEST
        }
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
