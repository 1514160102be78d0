mod cli;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use vodhub::api::{ApiRouter, DETAIL_ROUTE, SEARCH_ROUTE};
use vodhub::config::Settings;
use vodhub::types::ResultEnvelope;
use vodhub::{server, VodHub};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vodhub=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let hub = Arc::new(VodHub::new(settings)?);
    let api = ApiRouter::new(hub.clone());

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| hub.settings().bind.clone());
            server::serve(api, &bind).await?;
        }
        Commands::Search { query, source, custom_api } => {
            let mut params = HashMap::from([("wd".to_string(), query)]);
            params.extend(source.map(|s| ("source".to_string(), s)));
            params.extend(custom_api.map(|c| ("customApi".to_string(), c)));
            print_envelope(&api.dispatch(SEARCH_ROUTE, &params).await)?;
        }
        Commands::Detail { id, source, custom_api, scrape } => {
            let mut params = HashMap::from([("id".to_string(), id)]);
            params.extend(source.map(|s| ("source".to_string(), s)));
            params.extend(custom_api.map(|c| ("customApi".to_string(), c)));
            if scrape { params.insert("useDetail".to_string(), "true".to_string()); }
            print_envelope(&api.dispatch(DETAIL_ROUTE, &params).await)?;
        }
        Commands::Sources => {
            if hub.registry().is_empty() {
                println!("No providers configured.");
            }
            for p in hub.registry().all() {
                let kind = if p.is_special() { "scrape" } else { "json" };
                println!("{:<16} {:<6} {:<20} {}", p.key, kind, p.name, p.api);
            }
        }
        Commands::Check { url } => {
            let ok = hub.check_site(&url).await;
            println!("{}: {}", url, if ok { "available" } else { "unavailable" });
            if !ok { std::process::exit(1); }
        }
    }
    Ok(())
}

/// Print the envelope; a failed call exits non-zero.
fn print_envelope(envelope: &ResultEnvelope) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    if !envelope.is_success() { std::process::exit(1); }
    Ok(())
}
