//! Fire-and-forget snapshot delivery over loopback TCP
//!
//! One short-lived connection per payload. The caller hands bytes to a bounded
//! queue and returns immediately; a background worker thread running a
//! single-threaded tokio runtime spawns one task per payload, capped by a
//! semaphore. Failures are logged and the payload is dropped. Concurrent
//! deliveries may complete in any order.

use anyhow::{Context, Result};
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tracing::{debug, error, trace, warn};

use crate::constants::network::LOOPBACK;
use crate::constants::transport::WORKER_THREAD_NAME;
use crate::constants::validation::{MAX_IN_FLIGHT, MAX_QUEUE_CAPACITY};
use crate::error::TransportError;

/// Destination for encoded payloads
pub trait PayloadSink {
    /// Must not block and must not report failure
    fn push(&self, payload: Vec<u8>);
}

/// Endpoint and limits for [`AsyncTransport`]
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    pub port: u16,
    pub send_timeout: Duration,
    pub max_in_flight: usize,
    pub queue_capacity: usize,
}

impl TransportConfig {
    pub fn endpoint(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(LOOPBACK, self.port))
    }

    /// Limits forced into the same bounds as the settings file
    pub fn clamped(mut self) -> Self {
        let max_in_flight = self.max_in_flight.clamp(1, MAX_IN_FLIGHT);
        if max_in_flight != self.max_in_flight {
            warn!(requested = self.max_in_flight, using = max_in_flight, "max_in_flight out of range");
            self.max_in_flight = max_in_flight;
        }
        let queue_capacity = self.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY);
        if queue_capacity != self.queue_capacity {
            warn!(requested = self.queue_capacity, using = queue_capacity, "queue_capacity out of range");
            self.queue_capacity = queue_capacity;
        }
        self
    }
}

/// Handle to the delivery worker
///
/// Dropping the handle closes the queue; deliveries already queued or in
/// flight still run to completion or timeout on the worker thread.
pub struct AsyncTransport {
    queue: Option<mpsc::Sender<Vec<u8>>>,
    worker: Option<thread::JoinHandle<()>>,
    endpoint: SocketAddr,
}

impl AsyncTransport {
    /// Start the worker thread
    pub fn spawn(config: TransportConfig) -> Result<Self> {
        let config = config.clamped();
        let (queue, rx) = mpsc::channel(config.queue_capacity);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build delivery runtime")?;

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(run_worker(rx, config)))
            .context("Failed to spawn delivery thread")?;

        debug!(endpoint = %config.endpoint(), max_in_flight = config.max_in_flight, "Delivery worker started");
        Ok(Self {
            queue: Some(queue),
            worker: Some(worker),
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    /// Close the queue and wait for queued and in-flight deliveries to finish
    pub fn shutdown(mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Delivery worker panicked");
            }
        }
    }
}

impl PayloadSink for AsyncTransport {
    fn push(&self, payload: Vec<u8>) {
        let Some(queue) = &self.queue else {
            return;
        };
        let bytes = payload.len();
        match queue.try_send(payload) {
            Ok(()) => trace!(bytes = bytes, "Queued payload for delivery"),
            Err(TrySendError::Full(_)) => {
                warn!(bytes = bytes, "Delivery queue full, dropping payload")
            }
            Err(TrySendError::Closed(_)) => {
                debug!(bytes = bytes, "Delivery worker stopped, dropping payload")
            }
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Vec<u8>>, config: TransportConfig) {
    let max_in_flight = config.max_in_flight;
    let slots = Arc::new(Semaphore::new(max_in_flight));
    let endpoint = config.endpoint();

    while let Some(payload) = rx.recv().await {
        // Waiting here leaves later payloads in the bounded queue
        let Ok(permit) = slots.clone().acquire_owned().await else {
            break;
        };
        let limit = config.send_timeout;
        tokio::spawn(async move {
            let _permit = permit;
            match deliver(endpoint, &payload, limit).await {
                Ok(()) => debug!(endpoint = %endpoint, bytes = payload.len(), "Delivered snapshot"),
                Err(e) => debug!(endpoint = %endpoint, error = %e, "Snapshot delivery failed, payload dropped"),
            }
        });
    }

    // Every permit back means every spawned delivery has finished
    let all = u32::try_from(max_in_flight).unwrap_or(u32::MAX);
    let _ = slots.acquire_many(all).await;
    debug!("Delivery worker stopped");
}

/// Connect, write everything, close; the whole exchange is bounded by `limit`
pub async fn deliver(endpoint: SocketAddr, payload: &[u8], limit: Duration) -> Result<(), TransportError> {
    let attempt = async {
        let mut stream = TcpStream::connect(endpoint)
            .await
            .map_err(TransportError::Connect)?;
        stream.write_all(payload).await.map_err(TransportError::Write)?;
        stream.shutdown().await.map_err(TransportError::Write)?;
        Ok::<(), TransportError>(())
    };

    tokio::time::timeout(limit, attempt)
        .await
        .map_err(|_| TransportError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Read;
    use std::net::TcpListener;
    use std::time::Instant;

    fn config(port: u16) -> TransportConfig {
        TransportConfig {
            port,
            send_timeout: Duration::from_secs(5),
            max_in_flight: 4,
            queue_capacity: 16,
        }
    }

    /// A port nothing is listening on
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn read_one(listener: &TcpListener) -> Vec<u8> {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_push_delivers_full_payload_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = AsyncTransport::spawn(config(port)).unwrap();

        let payload = vec![b'x'; 200_000];
        transport.push(payload.clone());

        // read_to_end only returns once the sender closes
        assert_eq!(read_one(&listener), payload);
        transport.shutdown();
    }

    #[test]
    fn test_each_push_uses_its_own_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = AsyncTransport::spawn(config(port)).unwrap();

        let sent: HashSet<Vec<u8>> = (0..5).map(|i| format!("payload-{i}").into_bytes()).collect();
        for payload in &sent {
            transport.push(payload.clone());
        }

        // Arrival order is not guaranteed
        let received: HashSet<Vec<u8>> = (0..5).map(|_| read_one(&listener)).collect();
        assert_eq!(received, sent);
        transport.shutdown();
    }

    #[test]
    fn test_refused_connection_is_swallowed_and_push_is_prompt() {
        let transport = AsyncTransport::spawn(config(closed_port())).unwrap();

        let started = Instant::now();
        for _ in 0..3 {
            transport.push(b"{}".to_vec());
        }
        assert!(started.elapsed() < Duration::from_millis(500));

        // Worker drains without surfacing anything
        transport.shutdown();
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let transport = AsyncTransport::spawn(TransportConfig {
            port: closed_port(),
            send_timeout: Duration::from_secs(5),
            max_in_flight: 1,
            queue_capacity: 1,
        })
        .unwrap();

        let started = Instant::now();
        for _ in 0..1000 {
            transport.push(vec![0u8; 64]);
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        transport.shutdown();
    }

    #[test]
    fn test_config_limits_are_clamped() {
        let mut wild = config(0);
        wild.max_in_flight = usize::MAX;
        wild.queue_capacity = 0;

        let clamped = wild.clamped();
        assert_eq!(clamped.max_in_flight, MAX_IN_FLIGHT);
        assert_eq!(clamped.queue_capacity, 1);

        let sane = config(0).clamped();
        assert_eq!(sane.max_in_flight, 4);
        assert_eq!(sane.queue_capacity, 16);
    }

    #[test]
    fn test_oversized_in_flight_limit_still_delivers() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = AsyncTransport::spawn(TransportConfig {
            max_in_flight: usize::MAX,
            ..config(port)
        })
        .unwrap();

        transport.push(b"{}".to_vec());
        assert_eq!(read_one(&listener), b"{}");
        transport.shutdown();
    }

    #[tokio::test]
    async fn test_deliver_times_out_when_listener_never_reads() {
        // Accepts via the backlog but never reads, so socket buffers fill up
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = listener.local_addr().unwrap();
        let payload = vec![0u8; 64 * 1024 * 1024];
        let limit = Duration::from_millis(200);

        let started = Instant::now();
        let err = deliver(endpoint, &payload, limit).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
        assert!(started.elapsed() < limit + Duration::from_secs(2));
        drop(listener);
    }

    #[tokio::test]
    async fn test_deliver_reports_connect_failure() {
        let endpoint = SocketAddr::from(([127, 0, 0, 1], closed_port()));
        let err = deliver(endpoint, b"{}", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
    }
}
