//! Event delivery
//!
//! The engine emits one [`ExchangeEvent`] per successful mutating operation,
//! after the pool commit. Sinks must not fail the operation.

use dex_types::ExchangeEvent;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Receiver of exchange events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ExchangeEvent);
}

/// In-memory recorder, in emission order
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ExchangeEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<ExchangeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &ExchangeEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Writes each event as a structured log line with a JSON payload
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ExchangeEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(
                event = event.name(),
                pool = %event.pool(),
                actor = %event.actor(),
                "{}",
                payload
            ),
            Err(e) => warn!("Failed to serialize {} event: {}", event.name(), e),
        }
    }
}

/// Delivers every event to each wrapped sink in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &ExchangeEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_types::{Address, PoolKey};

    fn created(sequence: u64) -> ExchangeEvent {
        ExchangeEvent::PoolCreated {
            pool: PoolKey::new(Address::from_low_u64(1), Address::from_low_u64(2)).unwrap(),
            creator: Address::from_low_u64(0xaa),
            sequence,
        }
    }

    #[test]
    fn test_event_log_records_in_order() {
        let log = EventLog::new();
        assert!(log.is_empty());
        log.emit(&created(1));
        log.emit(&created(2));
        assert_eq!(log.events(), vec![created(1), created(2)]);

        log.clear();
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(EventLog::new());
        let second = Arc::new(EventLog::new());
        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(Arc::new(TracingSink))
            .with(second.clone());

        fanout.emit(&created(7));
        assert_eq!(first.len(), 1);
        assert_eq!(second.events(), vec![created(7)]);
    }
}
