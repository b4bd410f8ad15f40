use crate::api::routes;
use crate::config::SharedConfig;
use crate::micetro::SharedMicetroService;
use crate::token_store::SharedTokenStore;
use std::future::Future;

#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub tokens: SharedTokenStore,
    pub micetro: SharedMicetroService,
}

/// Serve the API on [`Config::api_bind_addr`][crate::config::Config::api_bind_addr] until
/// `shutdown` resolves.
pub fn new(
    state: AppState,
    shutdown: impl Future<Output = ()>,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&state.config.api_bind_addr)
        .serve(routes::new(state).into_make_service())
        .with_graceful_shutdown(shutdown)
}
