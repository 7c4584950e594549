// ABOUTME: Alerting Hook: non-blocking sink for breaker trips
use sentinel_types::ModelName;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum AlertEvent {
    BreakerOpened { model: ModelName, consecutive_failures: usize },
    BreakerClosed { model: ModelName },
    AllModelsFailed,
}

/// Sender half held by the Fallback Controller / Decision Engine. Enqueue
/// is always non-blocking: a full queue drops the alert rather than
/// stalling the request.
#[derive(Clone)]
pub struct AlertingHook {
    tx: mpsc::Sender<AlertEvent>,
}

impl AlertingHook {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AlertEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Never awaits; either the queue has room or the alert is dropped.
    pub fn notify(&self, event: AlertEvent) {
        if self.tx.try_send(event.clone()).is_err() {
            warn!(?event, "alert dropped: queue full or no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_delivers_when_queue_has_room() {
        let (hook, mut rx) = AlertingHook::new(4);
        hook.notify(AlertEvent::BreakerOpened {
            model: ModelName::Bart,
            consecutive_failures: 3,
        });
        let received = rx.recv().await;
        assert!(matches!(received, Some(AlertEvent::BreakerOpened { .. })));
    }

    #[test]
    fn notify_does_not_panic_on_full_queue() {
        let (hook, _rx) = AlertingHook::new(1);
        hook.notify(AlertEvent::AllModelsFailed);
        hook.notify(AlertEvent::AllModelsFailed);
        hook.notify(AlertEvent::AllModelsFailed);
    }
}
