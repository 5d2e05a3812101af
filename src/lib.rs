//! # TcpFrame - Line-Oriented TCP Server Framework
//!
//! TcpFrame is a reusable base for building line-oriented TCP servers. It owns
//! the socket lifecycle (accept loop, per-connection dispatch, remote shutdown
//! trigger) and a multi-sink trace pipeline, while the actual protocol is
//! supplied by the caller as an async callback.
//!
//! ## Features
//!
//! - **Per-Connection Workers**: every accepted connection runs in its own
//!   task; a failing connection never affects the others or the accept loop
//! - **Remote Shutdown**: a second listener on a control port treats any
//!   inbound connection as an unconditional shutdown signal
//! - **Multi-Sink Tracing**: console, text, XML, OS event and JSON document
//!   sinks behind one capability trait, each with its own severity floor
//! - **Injected Protocol**: servers are assembled, not subclassed
//!
//! ## Quick Start
//!
//! ```no_run
//! use tcpframe::config::ServerConfig;
//! use tcpframe::server::{ConnectionReader, ConnectionWriter, ProtocolFuture, TcpServer};
//! use tcpframe::trace::sinks::default_sinks;
//! use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
//!
//! fn echo(mut reader: ConnectionReader, mut writer: ConnectionWriter) -> ProtocolFuture {
//!     Box::pin(async move {
//!         let mut line = String::new();
//!         while reader.read_line(&mut line).await? > 0 {
//!             writer.write_all(line.as_bytes()).await?;
//!             writer.flush().await?;
//!             line.clear();
//!         }
//!         Ok(())
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new(9000, 9001, "echo");
//!     let server = TcpServer::new(config, default_sinks()?)?;
//!     server.start(echo).await?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod server;
pub mod trace;

/// Common error types used throughout TcpFrame
pub mod error {
    use std::fmt;

    /// TcpFrame error types
    #[derive(Debug)]
    pub enum ServerError {
        /// I/O operation failed
        Io(std::io::Error),
        /// Configuration error
        Config(String),
        /// Server failed to start (e.g. a listener could not bind)
        Startup(String),
    }

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ServerError::Io(e) => write!(f, "I/O error: {}", e),
                ServerError::Config(e) => write!(f, "Configuration error: {}", e),
                ServerError::Startup(e) => write!(f, "Startup error: {}", e),
            }
        }
    }

    impl std::error::Error for ServerError {}

    impl From<std::io::Error> for ServerError {
        fn from(err: std::io::Error) -> Self {
            ServerError::Io(err)
        }
    }

    /// Result type alias for TcpFrame operations
    pub type Result<T> = std::result::Result<T, ServerError>;
}

pub use error::{Result, ServerError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ServerConfig;
    pub use crate::server::{Protocol, ProtocolFuture, TcpServer};
    pub use crate::trace::sinks::{default_sinks, TraceSink};
    pub use crate::trace::{Severity, TraceEvent, TraceHub};
    pub use crate::{Result, ServerError};
}
