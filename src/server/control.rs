//! Remote shutdown trigger

use crate::server::LIFECYCLE_CODE;
use crate::trace::TraceHub;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Watches the control port and stops the server on any inbound connection
///
/// The connection itself is the signal; its payload is ignored and the
/// accepted socket drops immediately. The monitor fires the shutdown token
/// exactly once, then exits.
pub struct ShutdownMonitor {
    hub: Arc<TraceHub>,
    name: String,
    shutdown: CancellationToken,
}

impl ShutdownMonitor {
    /// Create a monitor for the named server
    pub fn new(hub: Arc<TraceHub>, name: String, shutdown: CancellationToken) -> Self {
        Self {
            hub,
            name,
            shutdown,
        }
    }

    /// Await a control-port connection or an external cancel
    ///
    /// On a connection: record the closing warning, close the trace hub,
    /// fire the token. On an external cancel the monitor exits without
    /// touching the hub.
    pub async fn run(self, listener: TcpListener) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                result = listener.accept() => match result {
                    Ok(_) => {
                        self.trigger();
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("Control port accept failed: {}", e);
                    }
                },
            }
        }
    }

    fn trigger(&self) {
        self.hub
            .warning(LIFECYCLE_CODE, format!("Closing server {}", self.name));
        self.hub.close();
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Severity;
    use tokio::net::TcpStream;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_any_connection_triggers_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let hub = Arc::new(TraceHub::new(Severity::Verbose, Vec::new()));
        let token = CancellationToken::new();
        let monitor = ShutdownMonitor::new(Arc::clone(&hub), "T".to_string(), token.clone());

        let handle = tokio::spawn(monitor.run(listener));

        // No payload needed; connecting is the signal.
        let _stream = TcpStream::connect(addr).await.unwrap();

        timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert!(token.is_cancelled());
        assert!(hub.is_closed());
    }

    #[tokio::test]
    async fn test_external_cancel_exits_without_closing_hub() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let hub = Arc::new(TraceHub::new(Severity::Verbose, Vec::new()));
        let token = CancellationToken::new();
        let monitor = ShutdownMonitor::new(Arc::clone(&hub), "T".to_string(), token.clone());

        let handle = tokio::spawn(monitor.run(listener));
        token.cancel();

        timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert!(!hub.is_closed());
    }
}
