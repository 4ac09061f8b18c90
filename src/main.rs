//! craftmargin server binary.

use craftmargin::{api, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("craftmargin=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    tracing::info!(
        bind = %config.bind_addr(),
        credentials = ?config.credentials,
        "Starting craftmargin {}",
        env!("CARGO_PKG_VERSION")
    );

    api::serve(config).await
}
