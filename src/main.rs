use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use mousetrap::api::AppState;
#[cfg(unix)]
use mousetrap::token_store::SharedTokenStore;
use mousetrap::{Config, HttpRpcClient, MicetroService, SharedConfig, TokenStore};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("mousetrap".to_string()),
        first_args.next(),
    );
    let config_file =
        config_file.ok_or_else(|| anyhow!("usage: {program_name} /path/to/config.json"))?;
    let config = config_init(&config_file)?;

    let tokens = TokenStore::new(config.bearer_tokens.clone());
    tracing::info!("loaded {} bearer tokens", tokens.len());
    let tokens = tokens.shared();

    let transport = Arc::new(HttpRpcClient::new(config.micetro.api_url.clone())?);
    let micetro = Arc::new(MicetroService::new(transport, config.micetro.clone()));
    tracing::info!(
        "Micetro API at {} (server \"{}\", session cache TTL {}s)",
        &config.micetro.api_url,
        &config.micetro.server,
        micetro.sessions().ttl().as_secs()
    );

    #[cfg(unix)]
    tokio::spawn(reload_tokens_on_hangup(config_file, tokens.clone()));

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let state = AppState {
        config,
        tokens,
        micetro,
    };
    mousetrap::api::new(state, shutdown_signal()).await?;

    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mousetrap=info".into()),
        )
        .init();
}

fn config_init(config_file: &str) -> Result<SharedConfig> {
    let config = Config::try_from_file(config_file)?;
    tracing::debug!("loaded config from {config_file}");
    Ok(Arc::new(config))
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("unable to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("quitting from signal");
}

/// Swap in a freshly built [`TokenStore`] whenever the process receives `SIGHUP`. Only the bearer
/// tokens are taken from the re-read config file.
#[cfg(unix)]
async fn reload_tokens_on_hangup(config_file: String, tokens: SharedTokenStore) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(hangups) => hangups,
        Err(err) => {
            tracing::error!("unable to listen for SIGHUP, token reload disabled: {err}");
            return;
        }
    };

    while hangups.recv().await.is_some() {
        match Config::try_from_file(&config_file) {
            Ok(config) => {
                let store = TokenStore::new(config.bearer_tokens);
                tracing::info!("reloaded {} bearer tokens from {config_file}", store.len());
                *tokens.write().await = Arc::new(store);
            }
            Err(err) => {
                tracing::error!(
                    "token reload from {config_file} failed, keeping previous tokens: {err:?}"
                );
            }
        }
    }
}
