//! Result sinks: where a finished test's results go.
//!
//! The engine only sees [`ResultSink`]. A sink receives the whole result
//! list once per completed test and either acknowledges it or returns a
//! [`SaveError`] whose message is shown to the subject verbatim.

pub mod json_file;
pub mod memory;
pub mod sink;

pub use json_file::{JsonFileSink, StoredRow};
pub use memory::MemorySink;
pub use sink::{
    ResultSink, STATUS_COMPLETED, SaveError, SaveReceipt, Session, UNCONFIGURED_MESSAGE,
    UnconfiguredSink,
};
