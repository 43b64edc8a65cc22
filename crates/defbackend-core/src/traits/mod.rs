//! Collaborator traits for the default backend
//!
//! - [`OperationHandler`]: Handle one kind of operation
//! - [`DispatchSink`]: Accept handler registrations from a backend
//! - [`ResultSender`]: Deliver results to clients
//! - [`BindCounters`]: Bind statistics counters
//! - [`DnExploder`]: Split DN strings into RDNs

pub mod counters;
pub mod dn_exploder;
pub mod handler;
pub mod result_sender;

pub use counters::BindCounters;
pub use dn_exploder::DnExploder;
pub use handler::{DispatchSink, OperationHandler};
pub use result_sender::ResultSender;
