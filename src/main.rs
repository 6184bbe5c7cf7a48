use std::future::IntoFuture;
use std::net::IpAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use filedrop::config::ServerConfig;
use filedrop::netif;
use filedrop::server::{AppState, admin_router, general_router};
use filedrop::storage::FileStore;

#[derive(Parser)]
#[command(name = "filedrop")]
#[command(about = "A LAN file exchange server", long_about = None)]
struct Cli {
    /// Address to bind both services to. When omitted, a LAN address is
    /// discovered from the local network interfaces (wireless preferred).
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port of the general file exchange service
    #[arg(long, short, default_value = "8080")]
    port: u16,

    /// Port of the admin service (server namespace only)
    #[arg(long, default_value = "8090")]
    admin_port: u16,

    /// Data directory holding the namespace roots
    #[arg(long, default_value = "./data")]
    data_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("filedrop=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = ServerConfig {
        host: cli.host.unwrap_or_else(netif::discover_bind_addr),
        port: cli.port,
        admin_port: cli.admin_port,
        data_dir: cli.data_dir.into(),
    };

    let store = FileStore::new(config.data_dir.clone());
    store.ensure_roots().await?;

    let state = Arc::new(AppState::new(store));
    let general = general_router(state.clone());
    let admin = admin_router(state);

    let general_listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    let admin_listener = tokio::net::TcpListener::bind(config.admin_socket_addr()).await?;

    info!("File exchange service running at http://{}", config.socket_addr());
    info!("Admin service running at http://{}", config.admin_socket_addr());

    tokio::try_join!(
        axum::serve(general_listener, general).into_future(),
        axum::serve(admin_listener, admin).into_future(),
    )?;

    Ok(())
}
