use anyhow::Error;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct Booter {
    pub addr: SocketAddr,
    tcp_listener: TcpListener,
}

impl Booter {
    /// Binds on all interfaces.
    pub async fn new(port: u16) -> Result<Self, Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let tcp_listener = TcpListener::bind(addr).await?;

        Ok(Self { addr, tcp_listener })
    }

    pub async fn start(self, router: Router) -> Result<(), Error> {
        axum::serve(self.tcp_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
