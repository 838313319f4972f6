//! Status change notification.
//!
//! Publication is best-effort: it never blocks the calling operation and
//! never surfaces a failure. Consumers must treat the latest observed status
//! as authoritative and tolerate dropped or out-of-order notifications.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::OrderId;
use domain::OrderStatus;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A published status-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Fire-and-forget publication of order status changes.
pub trait NotificationSink: Send + Sync {
    /// Publishes a status change. Never blocks, never fails.
    fn publish(&self, order_id: OrderId, status: OrderStatus);
}

/// Error from a notification transport; logged and swallowed by the worker.
pub type DeliveryError = Box<dyn std::error::Error + Send + Sync>;

/// Delivers notification events to an external bus.
#[async_trait]
pub trait NotificationTransport: Send + Sync + 'static {
    async fn deliver(&self, event: StatusChanged) -> Result<(), DeliveryError>;
}

/// Transport that writes a structured log line per event.
///
/// Stands in for a message-broker producer; the log line is the observable
/// contract.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, event: StatusChanged) -> Result<(), DeliveryError> {
        tracing::info!(
            order_id = %event.order_id,
            status = %event.status,
            "order status event published"
        );
        Ok(())
    }
}

/// Channel-backed sink with a dedicated background delivery worker.
///
/// `publish` enqueues and returns immediately; the worker drains the queue
/// and hands each event to the transport. Delivery failures are logged and
/// counted, never propagated.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StatusChanged>,
}

impl ChannelSink {
    /// Spawns the delivery worker and returns the sink plus its task handle.
    pub fn spawn<T: NotificationTransport>(transport: T) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<StatusChanged>();
        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(error) = transport.deliver(event).await {
                    metrics::counter!("notifications_failed_total").increment(1);
                    tracing::warn!(
                        order_id = %event.order_id,
                        status = %event.status,
                        %error,
                        "dropping status notification"
                    );
                }
            }
        });
        (Self { tx }, worker)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&self, order_id: OrderId, status: OrderStatus) {
        if self.tx.send(StatusChanged { order_id, status }).is_err() {
            metrics::counter!("notifications_dropped_total").increment(1);
            tracing::warn!(
                %order_id,
                %status,
                "notification worker stopped; dropping status notification"
            );
        }
    }
}

/// Sink that records every published event, for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StatusChanged>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events published so far.
    pub fn events(&self) -> Vec<StatusChanged> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the number of events published so far.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, order_id: OrderId, status: OrderStatus) {
        self.events
            .lock()
            .unwrap()
            .push(StatusChanged { order_id, status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Transport that counts deliveries and optionally fails them all.
    #[derive(Clone, Default)]
    struct CountingTransport {
        delivered: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationTransport for CountingTransport {
        async fn deliver(&self, _event: StatusChanged) -> Result<(), DeliveryError> {
            if self.fail {
                return Err("bus unavailable".into());
            }
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn drain() {
        // Give the worker a few scheduler turns to consume the queue.
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn channel_sink_delivers_in_background() {
        let transport = CountingTransport::default();
        let delivered = transport.delivered.clone();
        let (sink, worker) = ChannelSink::spawn(transport);

        sink.publish(OrderId::new(), OrderStatus::Pending);
        sink.publish(OrderId::new(), OrderStatus::Confirmed);
        drain().await;

        assert_eq!(delivered.load(Ordering::SeqCst), 2);
        drop(sink);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let transport = CountingTransport {
            fail: true,
            ..CountingTransport::default()
        };
        let (sink, _worker) = ChannelSink::spawn(transport);

        // Publishing never fails even though every delivery does.
        sink.publish(OrderId::new(), OrderStatus::Cancelled);
        drain().await;
    }

    #[tokio::test]
    async fn publish_after_worker_stop_is_dropped() {
        let (sink, worker) = ChannelSink::spawn(LogTransport);
        worker.abort();
        let _ = worker.await;

        // The channel may linger briefly after abort; publishing must simply
        // not panic or block.
        sink.publish(OrderId::new(), OrderStatus::Draft);
    }

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingSink::new();
        let order_id = OrderId::new();
        sink.publish(order_id, OrderStatus::Pending);

        assert_eq!(sink.count(), 1);
        assert_eq!(
            sink.events(),
            vec![StatusChanged {
                order_id,
                status: OrderStatus::Pending
            }]
        );
    }
}
