//! EventBus - hand-off from the solver worker to renderers and observers
//!
//! The worker thread emits events; the render loop and observers subscribe
//! and consume them on their own context.
//!
//! # Design
//!
//! - Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
//! - Non-blocking emit (callable from plain OS threads)
//! - Lagging receivers drop old events (no backpressure on the worker)
//! - Thread-safe via Clone (Arc internally)

use super::HanoiEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity for the event bus channel
pub const DEFAULT_CAPACITY: usize = 1024;

/// Central event bus
///
/// # Example
///
/// ```rust,ignore
/// use hanoi::events::{EventBus, HanoiEvent};
///
/// let bus = EventBus::new(1024);
/// let mut rx = bus.subscribe();
///
/// bus.emit(HanoiEvent::state_reset(3));
///
/// while let Ok(event) = rx.recv().await {
///     println!("Event: {:?}", event);
/// }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<HanoiEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the specified capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer before old events
    ///   are dropped for lagging receivers
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create an EventBus with default capacity (1024)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget. With no subscribers the event is dropped.
    pub fn emit(&self, event: HanoiEvent) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<HanoiEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================
    // Construction Tests
    // ==========================================

    #[test]
    fn test_new_with_capacity() {
        let bus = EventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = EventBus::new(0);
        let _rx = bus.subscribe();
        bus.emit(HanoiEvent::state_reset(1));
    }

    #[test]
    fn test_clone_shares_channel() {
        let bus1 = EventBus::new(100);
        let _rx1 = bus1.subscribe();

        let bus2 = bus1.clone();
        let _rx2 = bus2.subscribe();

        assert_eq!(bus1.subscriber_count(), 2);
        assert_eq!(bus2.subscriber_count(), 2);
    }

    // ==========================================
    // Emit Tests
    // ==========================================

    #[test]
    fn test_emit_without_subscribers_doesnt_panic() {
        let bus = EventBus::new(100);
        bus.emit(HanoiEvent::state_reset(3));
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.emit(HanoiEvent::run_completed(1, 7, 12.5));

        let event = rx.recv().await.unwrap();
        match event {
            HanoiEvent::RunCompleted { moves_applied, .. } => {
                assert_eq!(moves_applied, 7);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_emit_from_plain_thread() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let worker_bus = bus.clone();
        std::thread::spawn(move || {
            worker_bus.emit(HanoiEvent::run_paused(3, 4));
        })
        .join()
        .unwrap();

        let event = rx.blocking_recv().unwrap();
        assert_eq!(event.event_type(), "RunPaused");
    }

    #[tokio::test]
    async fn test_events_arrive_in_emit_order() {
        let bus = EventBus::new(2000);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        for i in 0..1000 {
            bus.emit(HanoiEvent::run_paused(1, i));
        }

        for rx in [&mut rx1, &mut rx2] {
            for i in 0..1000 {
                match rx.recv().await.unwrap() {
                    HanoiEvent::RunPaused { moves_applied, .. } => {
                        assert_eq!(moves_applied, i);
                    }
                    _ => panic!("Wrong event type"),
                }
            }
        }
    }

    // ==========================================
    // Subscriber Count Tests
    // ==========================================

    #[test]
    fn test_subscriber_count_decreases_on_drop() {
        let bus = EventBus::new(100);

        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx2);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
