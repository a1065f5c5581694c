//! Observability subsystem for agromart
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle and market events
//! - Deterministic counters
//! - Begin/complete scopes around long-running work
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes market state
//! 2. No background threads
//! 3. Logging failures are swallowed
//!
//! # Usage
//!
//! ```ignore
//! use agromart::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::EntityAdded, &[("kind", "region"), ("id", "0")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Only verifies that logging never panics
        log_event(Event::StartupBegin);
        log_event(Event::ShutdownComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::EntityRejected, &[("kind", "inventory"), ("id", "3")]);
    }
}
