use std::net;
use std::path::PathBuf;

use bird_domains::ExposeInternalErrors;
use bird_engine::{build_state, EngineRouter, VERSION};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser)]
#[command(version = VERSION)]
struct ServerOptions {
    /// The directory holding the benchmark database files
    /// (`<domain>.sqlite`).
    #[arg(long, value_name = "PATH", env = "DB_DIR")]
    db_dir: PathBuf,
    /// The host IP on which the server listens, defaulting to all IPv4 and IPv6 addresses.
    #[arg(long, value_name = "HOST", env = "HOST", default_value_t = net::IpAddr::V6(net::Ipv6Addr::UNSPECIFIED))]
    host: net::IpAddr,
    /// The port on which the server listens.
    #[arg(long, value_name = "PORT", env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Read-only connections opened per benchmark database.
    #[arg(
        long,
        value_name = "COUNT",
        env = "READ_CONNECTIONS",
        default_value_t = 4
    )]
    read_connections: usize,
    /// Enable CORS. Support preflight requests and include related headers in responses.
    #[arg(long, env = "ENABLE_CORS")]
    enable_cors: bool,
    /// The list of allowed origins for CORS. If not provided, all origins are allowed.
    /// Requires `--enable-cors` to be set.
    #[arg(
        long,
        value_name = "ORIGIN_LIST",
        env = "CORS_ALLOW_ORIGIN",
        requires = "enable_cors",
        value_delimiter = ','
    )]
    cors_allow_origin: Vec<String>,
    /// Whether internal errors should be shown or censored.
    /// It is recommended to only show errors while developing since internal
    /// errors may contain sensitive information.
    #[arg(long, env = "EXPOSE_INTERNAL_ERRORS")]
    expose_internal_errors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_options = ServerOptions::parse();
    start_engine(&server_options).await?;
    Ok(())
}

async fn start_engine(server: &ServerOptions) -> anyhow::Result<()> {
    let expose_internal_errors = if server.expose_internal_errors {
        ExposeInternalErrors::Expose
    } else {
        ExposeInternalErrors::Censor
    };

    let state = build_state(
        &server.db_dir,
        server.read_connections,
        expose_internal_errors,
    )?;

    let mut engine_router = EngineRouter::new(state);

    if server.enable_cors {
        engine_router.add_cors_layer(&server.cors_allow_origin);
    }

    let address = net::SocketAddr::new(server.host, server.port);
    info!(version = VERSION, %address, "starting server");

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, engine_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    // wait for a SIGINT, i.e. a Ctrl+C from the keyboard
    let sigint = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install signal handler");
    };
    // wait for a SIGTERM, i.e. a normal `kill` command
    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await
    };
    // block until either of the above happens
    #[cfg(unix)]
    tokio::select! {
        () = sigint => (),
        _ = sigterm => (),
    }
    #[cfg(windows)]
    sigint.await;
}
