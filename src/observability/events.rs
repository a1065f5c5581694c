//! Observable events for agromart
//!
//! Events are explicit and typed; the string form is what lands in the
//! `event` key of a log line.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    StartupBegin,
    ConfigLoaded,
    Serving,
    ShutdownComplete,

    // Entity tables
    /// Doc stored after a successful Info→Doc conversion
    EntityAdded,
    /// Info→Doc conversion failed; the id stays consumed
    EntityRejected,
    EntityUpdated,
    EntityRemoved,

    // Matching
    ReservationCommitted,
    ReservationRejected,
    QueryExecuted,

    // Dispatch
    RequestRejected,
    MetricsReport,

    /// Derived index state disagrees with the tables (FATAL)
    IndexInvariantViolated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "AGROMART_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "AGROMART_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::EntityAdded => "ENTITY_ADDED",
            Event::EntityRejected => "ENTITY_REJECTED",
            Event::EntityUpdated => "ENTITY_UPDATED",
            Event::EntityRemoved => "ENTITY_REMOVED",

            Event::ReservationCommitted => "RESERVATION_COMMITTED",
            Event::ReservationRejected => "RESERVATION_REJECTED",
            Event::QueryExecuted => "QUERY_COMPLETE",

            Event::RequestRejected => "REQUEST_REJECTED",
            Event::MetricsReport => "METRICS_REPORT",

            Event::IndexInvariantViolated => "INDEX_INVARIANT_VIOLATED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IndexInvariantViolated => Severity::Fatal,
            Event::EntityRejected | Event::ReservationRejected | Event::RequestRejected => {
                Severity::Warn
            }
            Event::QueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
