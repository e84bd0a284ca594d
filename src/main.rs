use std::sync::Arc;

use rsvp::config::Config;
use rsvp::models::HealthState;
use rsvp::sheets::{ServiceAccount, SheetsClient};
use rsvp::store::GuestStore;
use rsvp::{build_app, cli, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rsvp [serve | list | lookup <CODE> [BASE_URL]]";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rsvp=info,tower_http=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => serve().await,
        ["list"] => match open_store() {
            Ok((store, _)) => cli::list_rsvps(&store).await,
            Err(e) => Err(e),
        },
        ["lookup", code] => cli::lookup_remote("http://localhost:3000", code).await,
        ["lookup", code, base_url] => cli::lookup_remote(base_url, code).await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn open_store() -> Result<(GuestStore, Config), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    for warning in config.warnings() {
        tracing::warn!("configuration: {warning}");
    }

    let http = reqwest::Client::new();
    let tokens = ServiceAccount::new(
        config.sheets.client_email.clone(),
        &config.sheets.private_key,
        config.sheets.token_url.clone(),
        http.clone(),
    )?;
    let sheets = SheetsClient::new(
        http,
        &config.sheets.api_url,
        config.sheets.spreadsheet_id.clone(),
        Arc::new(tokens),
    )?;

    let store = GuestStore::new(Arc::new(sheets), config.store.clone());
    Ok((store, config))
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = open_store()?;

    let check = store.health_check().await;
    match check.status {
        HealthState::Healthy => tracing::info!("spreadsheet connection ok"),
        _ => tracing::warn!("spreadsheet not reachable at startup: {}", check.message),
    }

    let state = AppState {
        store: Arc::new(store),
        event: Arc::new(config.event.clone()),
        config_warnings: Arc::new(config.warnings()),
    };
    let app = build_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
