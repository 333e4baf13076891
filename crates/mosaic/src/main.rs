use std::time::Duration;

use clap::Parser;
use mosaic::prelude::*;
use mosaic::{DEFAULT_BIND, DEFAULT_MAX_LINE_BYTES};

#[derive(Parser)]
#[command(name = "mosaic-server", version, about = "Authoritative Mosaic game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "MOSAIC_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Milliseconds allowed for writing one line before a client is dropped.
    #[arg(long, env = "MOSAIC_WRITE_TIMEOUT_MS", default_value_t = 10_000)]
    write_timeout_ms: u64,

    /// Longest line a client may send, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    max_line_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<(), MosaicError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let server = MosaicServer::builder()
        .bind(&args.bind)
        .write_timeout(Duration::from_millis(args.write_timeout_ms))
        .max_line_bytes(args.max_line_bytes)
        .build()
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("ctrl-c received");
        })
        .await
}
