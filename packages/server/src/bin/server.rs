//! Single-room broadcast relay server.
//!
//! Every message a client sends over `/session` is delivered to all other
//! connected clients. `/` serves the bundled chat page.
//!
//! Run with:
//! ```not_rust
//! cd packages/server && cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, builder::RangedU64ValueParser};

use hiroba_server::{
    relay::SessionConfig,
    ui::{DEFAULT_PORT, Server, ServerConfig},
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket broadcast relay with a single shared room", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory holding index.html and assets/, relative to the working directory
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Seconds between keep-alive pings
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_secs: u64,

    /// Seconds between status log lines
    #[arg(long, default_value_t = 15 * 60, value_parser = clap::value_parser!(u64).range(1..))]
    status_interval_secs: u64,

    /// Undelivered messages allowed before a slow client is disconnected
    #[arg(
        long,
        default_value_t = 100,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    queue_capacity: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            session: SessionConfig {
                queue_capacity: args.queue_capacity,
                heartbeat_interval: Duration::from_secs(args.heartbeat_secs),
                ..SessionConfig::default()
            },
            status_interval: Duration::from_secs(args.status_interval_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(
        &[env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "tower_http"],
        "debug",
    );

    let args = Args::parse();

    let server = Server::new(ServerConfig::from(args));
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
