//! Event sink implementations

mod log;

pub use log::TracingEventSink;
