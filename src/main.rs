//! TcpFrame Echo Server Binary
//!
//! Demo server built on the framework: echoes every received line back in
//! uppercase until the client disconnects.

use clap::Parser;
use tcpframe::config::ServerConfig;
use tcpframe::server::{ConnectionReader, ConnectionWriter, ProtocolFuture, TcpServer};
use tcpframe::trace::sinks::default_sinks;
use tcpframe::trace::Severity;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tcpframe-echo")]
#[command(about = "Uppercase echo server built on the tcpframe base")]
#[command(version)]
struct Args {
    /// Service port to accept client connections on
    #[arg(short, long, default_value = "9000")]
    port: u16,

    /// Control port; any connection to it shuts the server down
    #[arg(short, long, default_value = "9001")]
    control_port: u16,

    /// Server name, used in trace text
    #[arg(short, long, default_value = "echo")]
    name: String,

    /// Minimum trace severity (off, error, warning, info, verbose)
    #[arg(short, long, default_value = "info")]
    severity: Severity,

    /// Enable verbose framework logging
    #[arg(long)]
    verbose: bool,
}

fn echo_protocol(mut reader: ConnectionReader, mut writer: ConnectionWriter) -> ProtocolFuture {
    Box::pin(async move {
        let mut line = String::new();
        while reader.read_line(&mut line).await? > 0 {
            writer.write_all(line.to_uppercase().as_bytes()).await?;
            writer.flush().await?;
            line.clear();
        }
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if args.verbose {
            "tcpframe=debug,info"
        } else {
            "tcpframe=info,warn,error"
        })
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting TcpFrame Echo Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Service port: {}", args.port);
    info!("Control port: {}", args.control_port);

    let mut config = ServerConfig::new(args.port, args.control_port, &args.name);
    config.min_severity = args.severity;

    let server = TcpServer::new(config, default_sinks()?)?;

    if let Err(e) = server.start(echo_protocol).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("TcpFrame Echo Server stopped");
    Ok(())
}
