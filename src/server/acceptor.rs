//! Connection acceptance and per-connection workers

use crate::server::{Protocol, LIFECYCLE_CODE};
use crate::trace::TraceHub;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

/// Accepts connections one at a time and dispatches each to its own worker
///
/// The acceptor never blocks on a worker: `accept_once` returns as soon as
/// the worker task is spawned, so a stalled or failing connection cannot
/// hold up the accept loop.
pub struct ConnectionAcceptor {
    hub: Arc<TraceHub>,
    work: Arc<dyn Protocol>,
}

impl ConnectionAcceptor {
    /// Create an acceptor that runs `work` on every accepted connection
    pub fn new(hub: Arc<TraceHub>, work: Arc<dyn Protocol>) -> Self {
        Self { hub, work }
    }

    /// Wait for one connection, spawn its worker, and return
    pub async fn accept_once(&self, listener: &TcpListener) -> io::Result<()> {
        let (stream, peer) = listener.accept().await?;

        self.hub
            .info(LIFECYCLE_CODE, format!("New client: {}", peer));

        let hub = Arc::clone(&self.hub);
        let work = Arc::clone(&self.work);
        tokio::spawn(async move {
            Self::handle_connection(stream, peer, hub, work).await;
        });

        Ok(())
    }

    /// Run the protocol callback over the connection, then release it
    ///
    /// The stream halves are moved into the callback, so the socket closes
    /// on every exit path. A callback error terminates only this worker and
    /// is recorded at Error severity.
    async fn handle_connection(
        stream: TcpStream,
        peer: SocketAddr,
        hub: Arc<TraceHub>,
        work: Arc<dyn Protocol>,
    ) {
        let (read_half, write_half) = stream.into_split();
        let reader = BufReader::new(read_half);

        if let Err(e) = work.run(reader, write_half).await {
            hub.error(LIFECYCLE_CODE, format!("Connection {} failed: {}", peer, e));
        }

        hub.info(LIFECYCLE_CODE, format!("Closing connection: {}", peer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{ConnectionReader, ConnectionWriter, ProtocolFuture};
    use crate::trace::Severity;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};
    use tokio::time::{timeout, Duration};

    fn echo_protocol(mut reader: ConnectionReader, mut writer: ConnectionWriter) -> ProtocolFuture {
        Box::pin(async move {
            let mut line = String::new();
            while reader.read_line(&mut line).await? > 0 {
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
                line.clear();
            }
            Ok(())
        })
    }

    fn empty_hub() -> Arc<TraceHub> {
        Arc::new(TraceHub::new(Severity::Verbose, Vec::new()))
    }

    #[tokio::test]
    async fn test_accept_once_dispatches_worker() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = ConnectionAcceptor::new(empty_hub(), Arc::new(echo_protocol));

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"ping\n").await.unwrap();
            stream.shutdown().await.unwrap();

            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        });

        acceptor.accept_once(&listener).await.unwrap();

        let response = timeout(Duration::from_secs(1), client).await.unwrap().unwrap();
        assert_eq!(response, "ping\n");
    }

    #[tokio::test]
    async fn test_worker_closes_socket_on_callback_error() {
        fn failing(_reader: ConnectionReader, _writer: ConnectionWriter) -> ProtocolFuture {
            Box::pin(async { Err(io::Error::new(io::ErrorKind::Other, "boom")) })
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = ConnectionAcceptor::new(empty_hub(), Arc::new(failing));

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut buf = Vec::new();
            // EOF arrives once the worker drops its halves.
            stream.read_to_end(&mut buf).await.unwrap();
            buf
        });

        acceptor.accept_once(&listener).await.unwrap();

        let buf = timeout(Duration::from_secs(1), client).await.unwrap().unwrap();
        assert!(buf.is_empty());
    }
}
