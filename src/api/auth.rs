use crate::api::api_error::APIError;
use crate::api::server::AppState;
use crate::error::Error;
use crate::token_store::Principal;
use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

/// Resolve the request's bearer credential, if any, and attach the [`Principal`] to this
/// request's extensions. Requests without a usable credential pass through unauthenticated;
/// endpoints that need a principal reject them with [`Authenticated`].
pub(super) async fn authenticate<B>(
    State(state): State<AppState>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let principal = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(header) => {
            let tokens = state.tokens.read().await.clone();
            tokens.resolve_header(header)
        }
        None => None,
    };

    match principal {
        Some(principal) => {
            let span = tracing::info_span!(
                "principal",
                name = %principal.name,
                owner = %principal.owner
            );
            request.extensions_mut().insert(principal);
            next.run(request).instrument(span).await
        }
        None => next.run(request).await,
    }
}

/// Extractor for the [`Principal`] attached by [`authenticate`]. Rejects with HTTP 401 when the
/// request isn't authenticated.
#[derive(Debug, Clone)]
pub(super) struct Authenticated(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| Error::AuthenticationRequired.into())
    }
}
