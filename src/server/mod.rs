//! TCP server lifecycle
//!
//! [`TcpServer`] orchestrates start-up (bind both listeners, build the trace
//! hub), the accept loop, and termination when the shutdown token fires.
//! Protocol behavior is injected through the [`Protocol`] trait.

pub mod acceptor;
pub mod control;

use crate::config::ServerConfig;
use crate::trace::sinks::TraceSink;
use crate::trace::TraceHub;
use crate::{Result, ServerError};
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use acceptor::ConnectionAcceptor;
pub use control::ShutdownMonitor;

/// Event code stamped on lifecycle traces
pub(crate) const LIFECYCLE_CODE: u32 = 256;

/// Buffered read half of an accepted connection
pub type ConnectionReader = BufReader<OwnedReadHalf>;

/// Write half of an accepted connection
pub type ConnectionWriter = OwnedWriteHalf;

/// Boxed future returned by a protocol callback
pub type ProtocolFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

/// Protocol behavior run once per accepted connection
///
/// The callback owns both stream halves for the whole session; when its
/// future completes (or fails) the halves drop and the socket closes. An
/// `Err` is isolated to that connection and logged at Error severity.
///
/// Implemented for any matching closure returning a boxed future:
///
/// ```no_run
/// use tcpframe::server::{ConnectionReader, ConnectionWriter, ProtocolFuture};
///
/// fn quiet(_reader: ConnectionReader, _writer: ConnectionWriter) -> ProtocolFuture {
///     Box::pin(async { Ok(()) })
/// }
/// ```
pub trait Protocol: Send + Sync + 'static {
    /// Drive one session over the connection's streams
    fn run(&self, reader: ConnectionReader, writer: ConnectionWriter) -> ProtocolFuture;
}

impl<F> Protocol for F
where
    F: Fn(ConnectionReader, ConnectionWriter) -> ProtocolFuture + Send + Sync + 'static,
{
    fn run(&self, reader: ConnectionReader, writer: ConnectionWriter) -> ProtocolFuture {
        (self)(reader, writer)
    }
}

/// Line-oriented TCP server base
///
/// Owns the service and control listeners, the trace hub, and the one-shot
/// shutdown token. The protocol callback is supplied to [`start`](Self::start).
pub struct TcpServer {
    config: ServerConfig,
    hub: Arc<TraceHub>,
    shutdown: CancellationToken,
}

impl TcpServer {
    /// Create a server from a validated configuration and an injected sink
    /// list
    pub fn new(config: ServerConfig, sinks: Vec<Box<dyn TraceSink>>) -> Result<Self> {
        config.validate()?;
        let hub = Arc::new(TraceHub::new(config.min_severity, sinks));
        Ok(Self {
            config,
            hub,
            shutdown: CancellationToken::new(),
        })
    }

    /// Handle to the server's trace hub
    pub fn trace_hub(&self) -> Arc<TraceHub> {
        Arc::clone(&self.hub)
    }

    /// Clone of the shutdown token, for observing or triggering shutdown
    /// from outside the control port
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether the server is still accepting connections
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Run the server until the shutdown token fires
    ///
    /// Binds both listeners (a bind failure aborts start-up with
    /// [`ServerError::Startup`]), records the start-up event, spawns the
    /// shutdown monitor, then accepts connections until a control-port
    /// connection or an external cancel stops the loop. In-flight connection
    /// workers are not awaited; they run to completion on their own.
    pub async fn start<W: Protocol>(self, work: W) -> Result<()> {
        let listener = Self::bind("service", self.config.service_port).await?;
        let control = Self::bind("control", self.config.control_port).await?;

        self.hub
            .info(LIFECYCLE_CODE, format!("Server {} started.", self.config.name));

        let monitor = ShutdownMonitor::new(
            Arc::clone(&self.hub),
            self.config.name.clone(),
            self.shutdown.clone(),
        );
        tokio::spawn(monitor.run(control));

        let acceptor = ConnectionAcceptor::new(Arc::clone(&self.hub), Arc::new(work));
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = acceptor.accept_once(&listener) => {
                    if let Err(e) = result {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                }
            }
        }

        // Listeners unbind on drop; workers already dispatched keep running.
        Ok(())
    }

    async fn bind(role: &str, port: u16) -> Result<TcpListener> {
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map_err(|e| {
                ServerError::Startup(format!("Failed to bind {} port {}: {}", role, port, e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Severity;

    fn quiet_protocol(_reader: ConnectionReader, _writer: ConnectionWriter) -> ProtocolFuture {
        Box::pin(async { Ok(()) })
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let config = ServerConfig::new(9000, 9000, "dup");
        assert!(TcpServer::new(config, Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_start_reports_bind_failure() {
        let taken = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let control_port = if port == u16::MAX { port - 1 } else { port + 1 };
        let config = ServerConfig::new(port, control_port, "clash");

        let server = TcpServer::new(config, Vec::new()).unwrap();
        let err = server.start(quiet_protocol).await.unwrap_err();
        match err {
            ServerError::Startup(msg) => assert!(msg.contains("service port")),
            other => panic!("expected Startup error, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_external_cancel_stops_loop() {
        let config = ServerConfig::new(42511, 42512, "cancel-test");
        let server = TcpServer::new(config, Vec::new()).unwrap();
        let token = server.shutdown_token();
        assert!(server.is_running());

        let handle = tokio::spawn(server.start(quiet_protocol));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        token.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("server should stop after cancel")
            .unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_one_shot_token_never_unfires() {
        let config = ServerConfig::new(9000, 9001, "one-shot");
        let server = TcpServer::new(config, Vec::new()).unwrap();
        let token = server.shutdown_token();

        token.cancel();
        assert!(!server.is_running());
        token.cancel();
        assert!(!server.is_running());
    }

    #[test]
    fn test_hub_uses_config_switch() {
        let mut config = ServerConfig::default();
        config.min_severity = Severity::Error;
        let server = TcpServer::new(config, Vec::new()).unwrap();
        let hub = server.trace_hub();
        // Below-switch events are dropped without touching any sink.
        hub.info(LIFECYCLE_CODE, "dropped");
        assert!(!hub.is_closed());
    }
}
