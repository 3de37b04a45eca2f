//! tiercache CLI - Main entry point

mod cli;
mod interactive;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// tiercache - line-delimited JSON calc/gpt server with a transparent caching proxy
#[derive(Parser, Debug)]
#[command(name = "tiercache")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the authoritative calc/gpt server
    Server {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Result cache capacity (LRU)
        #[arg(long)]
        cache_size: Option<usize>,
        /// Maximum number of concurrently served connections
        #[arg(long)]
        max_connections: Option<usize>,
    },
    /// Run the caching proxy in front of a server
    Proxy {
        #[arg(long)]
        listen_host: Option<String>,
        #[arg(long)]
        listen_port: Option<u16>,
        #[arg(long)]
        server_host: Option<String>,
        #[arg(long)]
        server_port: Option<u16>,
        /// Upstream connect timeout in milliseconds
        #[arg(long)]
        connect_timeout_ms: Option<u64>,
        #[arg(long)]
        max_connections: Option<usize>,
    },
    /// Interactive client (menu driven, one persistent connection)
    Client {
        #[arg(long)]
        host: Option<String>,
        /// Connect to this port directly instead of asking server/proxy
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        server_port: Option<u16>,
        #[arg(long)]
        proxy_port: Option<u16>,
    },
    /// Send a single request and print the JSON reply
    Send {
        #[arg(long)]
        host: Option<String>,
        /// Target port (default: server port)
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, value_enum, default_value_t = Mode::Calc)]
        mode: Mode,
        /// Expression for calc mode
        #[arg(long)]
        expr: Option<String>,
        /// Prompt for gpt mode
        #[arg(long)]
        prompt: Option<String>,
        /// Set options.cache = false
        #[arg(long)]
        no_cache: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Calc,
    Gpt,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env 먼저 로드 (API 키)
    let _ = dotenvy::dotenv();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = tiercache_foundation::TierConfig::load()?;

    match args.command {
        Command::Server {
            host,
            port,
            cache_size,
            max_connections,
        } => {
            config.server.merge(tiercache_foundation::config::ServerSection {
                host,
                port,
                cache_size,
                max_connections,
            });
            cli::run_server(&config).await
        }
        Command::Proxy {
            listen_host,
            listen_port,
            server_host,
            server_port,
            connect_timeout_ms,
            max_connections,
        } => {
            config.proxy.merge(tiercache_foundation::config::ProxySection {
                listen_host,
                listen_port,
                server_host,
                server_port,
                connect_timeout_ms,
                max_connections,
            });
            cli::run_proxy(&config).await
        }
        Command::Client {
            host,
            port,
            server_port,
            proxy_port,
        } => {
            config.client.merge(tiercache_foundation::config::ClientSection {
                host,
                server_port,
                proxy_port,
                connect_timeout_ms: None,
            });
            interactive::run(&config.client_settings(), port).await
        }
        Command::Send {
            host,
            port,
            mode,
            expr,
            prompt,
            no_cache,
        } => {
            config.client.merge(tiercache_foundation::config::ClientSection {
                host,
                ..Default::default()
            });
            let text = match mode {
                Mode::Calc => expr,
                Mode::Gpt => prompt,
            };
            cli::run_send(&config.client_settings(), port, mode, text, !no_cache).await
        }
    }
}
