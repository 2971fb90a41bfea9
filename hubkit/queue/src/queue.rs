//! The per-hub serializing transmission queue.
//!
//! One task owns the transport write side and processes requests strictly in
//! submission order. Each request is an explicit little state machine:
//! `Sent -> Completed(Option<Response>) | Failed(error)`, resolved exactly
//! once by the first of transport failure, immediate completion for kinds
//! that expect no response, a structurally matching inbound response, or the
//! configured timeout.

use crate::policy;
use crate::transport::{Transport, TransportError};
use hubkit_wire::{Request, RequestBody, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Transmission queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How long to wait for a correlated response before failing the
    /// request. `None` waits forever, which wedges the queue if the hub
    /// silently drops a response.
    pub response_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            response_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Errors resolving a queued request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The transport is gone; the request failed immediately
    #[error("transport unavailable")]
    TransportUnavailable,
    /// The transport reported a write failure
    #[error("transmission failed: {0}")]
    Transmission(TransportError),
    /// No matching response arrived within the configured timeout
    #[error("timed out waiting for response")]
    Timeout,
    /// The queue task is gone
    #[error("transmission queue closed")]
    Closed,
}

impl From<TransportError> for QueueError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Unavailable => QueueError::TransportUnavailable,
            other => QueueError::Transmission(other),
        }
    }
}

/// Counters for a queue's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests handed to the transport
    pub sent: u64,
    /// Requests resolved successfully
    pub completed: u64,
    /// Requests resolved with an error (timeouts included)
    pub failed: u64,
    /// Requests that timed out waiting for a response
    pub timed_out: u64,
}

#[derive(Debug, Default)]
struct StatsInner {
    sent: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

impl StatsInner {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            sent: self.sent.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

struct PendingRequest {
    body: RequestBody,
    reply: oneshot::Sender<Result<Option<Response>, QueueError>>,
}

/// Cloneable handle to a spawned transmission queue.
#[derive(Clone)]
pub struct QueueHandle {
    cmd_tx: mpsc::UnboundedSender<PendingRequest>,
    inbound_tx: mpsc::UnboundedSender<Response>,
    stats: Arc<StatsInner>,
}

impl QueueHandle {
    /// Submit a request and await its resolution.
    ///
    /// Requests resolve strictly in submission order; `Ok(None)` means the
    /// kind expects no response.
    pub async fn request(&self, body: RequestBody) -> Result<Option<Response>, QueueError> {
        let (reply, resolution) = oneshot::channel();
        self.cmd_tx
            .send(PendingRequest { body, reply })
            .map_err(|_| QueueError::Closed)?;
        resolution.await.map_err(|_| QueueError::Closed)?
    }

    /// Feed one decoded inbound response to the correlation matcher.
    pub fn dispatch(&self, response: Response) {
        let _ = self.inbound_tx.send(response);
    }

    /// Snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }
}

/// The queue task: owns the transport write side and the in-flight slot.
pub struct TransmissionQueue {
    hub_id: u8,
    transport: Arc<dyn Transport>,
    config: QueueConfig,
    cmd_rx: mpsc::UnboundedReceiver<PendingRequest>,
    inbound_rx: mpsc::UnboundedReceiver<Response>,
    stats: Arc<StatsInner>,
}

impl TransmissionQueue {
    /// Spawn the queue task for one hub and return its handle.
    pub fn spawn(hub_id: u8, transport: Arc<dyn Transport>, config: QueueConfig) -> QueueHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(StatsInner::default());

        let queue = Self {
            hub_id,
            transport,
            config,
            cmd_rx,
            inbound_rx,
            stats: Arc::clone(&stats),
        };
        tokio::spawn(queue.run());

        QueueHandle {
            cmd_tx,
            inbound_tx,
            stats,
        }
    }

    async fn run(mut self) {
        while let Some(pending) = self.cmd_rx.recv().await {
            self.transmit(pending).await;
        }
        debug!(hub = self.hub_id, "transmission queue stopped");
    }

    async fn transmit(&mut self, pending: PendingRequest) {
        // Drop responses that arrived while nothing was in flight; a stale
        // response must never resolve a later request.
        while self.inbound_rx.try_recv().is_ok() {}

        let request = Request::encode(self.hub_id, pending.body);
        trace!(
            hub = self.hub_id,
            message_type = request.message_type,
            len = request.raw.len(),
            "transmitting request"
        );

        self.stats.sent.fetch_add(1, Ordering::Relaxed);
        if let Err(error) = self.transport.write(request.raw.clone()).await {
            warn!(hub = self.hub_id, %error, "transport write failed");
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            let _ = pending.reply.send(Err(error.into()));
            return;
        }

        if !policy::expects_response(&request.body) {
            self.stats.completed.fetch_add(1, Ordering::Relaxed);
            let _ = pending.reply.send(Ok(None));
            return;
        }

        let deadline = self.config.response_timeout.map(|t| Instant::now() + t);
        let result = loop {
            let received = match deadline {
                Some(at) => match tokio::time::timeout_at(at, self.inbound_rx.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        warn!(
                            hub = self.hub_id,
                            message_type = request.message_type,
                            "request timed out awaiting response"
                        );
                        break Err(QueueError::Timeout);
                    }
                },
                None => self.inbound_rx.recv().await,
            };

            match received {
                Some(response) if policy::matches_response(&request.body, &response.body) => {
                    break Ok(Some(response));
                }
                Some(other) => {
                    // Not ours: unsolicited traffic also reaches the port
                    // model through the hub dispatch path.
                    trace!(
                        hub = self.hub_id,
                        message_type = other.message_type,
                        "inbound message does not match in-flight request"
                    );
                }
                None => break Err(QueueError::Closed),
            }
        };

        match &result {
            Ok(_) => {
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                if *error == QueueError::Timeout {
                    self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                }
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        let _ = pending.reply.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use hubkit_wire::{HubAction, ResponseBody, ResponseDecoder};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockTransport {
        writes: Mutex<Vec<Bytes>>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn write(&self, frame: Bytes) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Write("characteristic gone".to_owned()));
            }
            self.writes.lock().unwrap().push(frame);
            Ok(())
        }
    }

    fn lock_status_response() -> Response {
        let mut decoder = ResponseDecoder::new();
        decoder.decode(&[3, 0, 0x13]).remove(0)
    }

    async fn wait_for_writes(transport: &MockTransport, count: usize) {
        for _ in 0..100 {
            if transport.writes.lock().unwrap().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("transport never reached {count} writes");
    }

    #[tokio::test]
    async fn test_no_response_kind_completes_immediately() {
        let transport = Arc::new(MockTransport::default());
        let queue = TransmissionQueue::spawn(0, transport.clone(), QueueConfig::default());

        let result = queue.request(RequestBody::Action(HubAction::SwitchOff)).await;
        assert_eq!(result, Ok(None));
        assert_eq!(transport.writes.lock().unwrap().len(), 1);
        assert_eq!(queue.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_response_correlation() {
        let transport = Arc::new(MockTransport::default());
        let queue = TransmissionQueue::spawn(0, transport.clone(), QueueConfig::default());

        let request = tokio::spawn({
            let queue = queue.clone();
            async move { queue.request(RequestBody::LockStatusRequest).await }
        });
        wait_for_writes(&transport, 1).await;

        // Unrelated traffic first, then the matching response.
        let mut decoder = ResponseDecoder::new();
        let unrelated = decoder.decode(&[4, 0, 2, 1]).remove(0);
        queue.dispatch(unrelated);
        queue.dispatch(lock_status_response());

        let resolved = request.await.unwrap().unwrap().unwrap();
        assert_eq!(resolved.body, ResponseBody::LockStatus { locked: true });
    }

    #[tokio::test]
    async fn test_transport_failure_fails_request() {
        let transport = Arc::new(MockTransport {
            fail: true,
            ..Default::default()
        });
        let queue = TransmissionQueue::spawn(0, transport, QueueConfig::default());

        let result = queue.request(RequestBody::LockStatusRequest).await;
        assert!(matches!(result, Err(QueueError::Transmission(_))));
        assert_eq!(queue.stats().failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_request_and_queue_recovers() {
        let transport = Arc::new(MockTransport::default());
        let queue = TransmissionQueue::spawn(0, transport, QueueConfig::default());

        let result = queue.request(RequestBody::LockStatusRequest).await;
        assert_eq!(result, Err(QueueError::Timeout));
        assert_eq!(queue.stats().timed_out, 1);

        // The next request is unaffected.
        let result = queue.request(RequestBody::Action(HubAction::SwitchOff)).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_resolves_later_request() {
        let transport = Arc::new(MockTransport::default());
        let queue = TransmissionQueue::spawn(0, transport, QueueConfig::default());

        // A response arrives while nothing is in flight.
        queue.dispatch(lock_status_response());

        // The next lock status request must not be resolved by it.
        let result = queue.request(RequestBody::LockStatusRequest).await;
        assert_eq!(result, Err(QueueError::Timeout));
    }

    #[tokio::test]
    async fn test_requests_resolve_in_submission_order() {
        let transport = Arc::new(MockTransport::default());
        let queue = TransmissionQueue::spawn(0, transport.clone(), QueueConfig::default());

        let first = tokio::spawn({
            let queue = queue.clone();
            async move { queue.request(RequestBody::LockStatusRequest).await }
        });
        wait_for_writes(&transport, 1).await;

        let second = tokio::spawn({
            let queue = queue.clone();
            async move { queue.request(RequestBody::Action(HubAction::Disconnect)).await }
        });

        // Only the first request may be on the wire until it resolves.
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.writes.lock().unwrap().len(), 1);

        queue.dispatch(lock_status_response());
        assert!(first.await.unwrap().is_ok());
        assert_eq!(second.await.unwrap(), Ok(None));

        let writes = transport.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0][2], 0x12);
        assert_eq!(writes[1][2], 0x02);
    }
}
