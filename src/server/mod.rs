pub mod api;

pub use api::{ build_router, AppCtx };

use crate::cli::Args;
use log::info;
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    addr: String,
    ctx: AppCtx,
    args: Args,
}

impl Server {
    pub fn new(addr: String, ctx: AppCtx, args: Args) -> Self {
        Self { addr, ctx, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::build_router(self.ctx.clone());

        if
            self.args.enable_tls &&
            self.args.tls_cert_path.is_some() &&
            self.args.tls_key_path.is_some()
        {
            let cert_path = self.args.tls_cert_path.as_ref().unwrap();
            let key_path = self.args.tls_key_path.as_ref().unwrap();

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Starting HTTPS server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        } else {
            info!("Starting HTTP server on: http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}
