pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod render;
pub mod server;
pub mod store;
pub mod upstream;

use app::ChatApp;
use cli::Args;
use log::info;
use server::{ AppCtx, Server };
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use upstream::UpstreamClient;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Upstream Endpoint: {}", args.endpoint_url);
    info!("State Store Type: {}", args.state_type);
    info!("State Directory: {}", args.state_dir);
    info!("Widget Config Path: {}", args.widget_config_path);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let widget_config = config::load_widget_config(&args.widget_config_path)?;
    let backend = store::create_snapshot_store(&args)?;
    let chat_app = ChatApp::new(backend, widget_config).await?;
    let upstream = UpstreamClient::new(args.endpoint_url.clone());

    let ctx = AppCtx {
        app: Arc::new(Mutex::new(chat_app)),
        upstream: Arc::new(upstream),
        widget_config_path: args.widget_config_path.clone(),
    };

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, ctx, args);
    server.run().await?;

    Ok(())
}
