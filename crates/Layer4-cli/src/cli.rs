//! Non-interactive commands: server, proxy, send

use crate::Mode;
use anyhow::{bail, Context};
use std::sync::Arc;
use tiercache_core::{client, net, Dispatcher, ProxyService, ServerService, TcpForwarder};
use tiercache_foundation::{ClientSettings, TierConfig};
use tiercache_provider::{from_settings, Provider};
use tokio::net::TcpListener;

/// Run the calc/gpt server until Ctrl-C
pub async fn run_server(config: &TierConfig) -> anyhow::Result<()> {
    let settings = config.server_settings()?;
    let provider_settings = config.provider_settings();

    let provider = from_settings(&provider_settings)?;
    tracing::info!(
        provider = provider.id(),
        model = provider.model(),
        available = provider.is_available(),
        "text completion provider ready"
    );

    let service = Arc::new(ServerService::new(
        settings.cache_size,
        Dispatcher::new(Arc::new(provider)),
    ));

    let listener = TcpListener::bind(settings.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_address()))?;
    tracing::info!(cache = service.cache().capacity(), "server starting");

    net::serve(listener, Arc::clone(&service), settings.max_connections, shutdown_signal()).await?;

    let stats = service.cache().stats();
    tracing::info!(
        entries = stats.lru.entries,
        evictions = stats.lru.evictions,
        hit_rate = %format!("{:.1}%", stats.hit_rate() * 100.0),
        "server stopped"
    );
    Ok(())
}

/// Run the caching proxy until Ctrl-C
pub async fn run_proxy(config: &TierConfig) -> anyhow::Result<()> {
    let settings = config.proxy_settings()?;

    let forwarder = TcpForwarder::new(settings.upstream_address(), settings.connect_timeout);
    let service = Arc::new(ProxyService::new(forwarder));

    let listener = TcpListener::bind(settings.listen_address())
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_address()))?;
    tracing::info!(upstream = %settings.upstream_address(), "proxy forwarding");

    net::serve(listener, Arc::clone(&service), settings.max_connections, shutdown_signal()).await?;

    tracing::info!(cached_replies = service.cache().len(), "proxy stopped");
    Ok(())
}

/// Send one request and print the raw JSON reply
pub async fn run_send(
    settings: &ClientSettings,
    port: Option<u16>,
    mode: Mode,
    text: Option<String>,
    use_cache: bool,
) -> anyhow::Result<()> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        match mode {
            Mode::Calc => bail!("--expr is required for calc mode"),
            Mode::Gpt => bail!("--prompt is required for gpt mode"),
        }
    };

    let payload = match mode {
        Mode::Calc => client::calc_payload(text.trim(), use_cache),
        Mode::Gpt => client::gpt_payload(text.trim(), use_cache),
    };

    let addr = format!("{}:{}", settings.host, port.unwrap_or(settings.server_port));
    let reply = client::request(&addr, &payload, settings.connect_timeout)
        .await
        .with_context(|| format!("request to {} failed", addr))?;

    println!("{}", serde_json::to_string(&reply)?);
    Ok(())
}

/// Ctrl-C 대기
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
