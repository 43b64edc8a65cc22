// # Result Sender Trait
//
// Defines the interface the default backend uses to deliver a result to the
// client. Serialization and the network write belong to the frontend.
//
// ## Implementations
//
// - In-memory recorder: `crate::delivery::MemoryResultSender`
// - Frontend connection writer: provided by the server embedding this crate

use crate::operation::Operation;
use crate::result::LdapResult;

/// Trait for result delivery
///
/// # Thread Safety
///
/// Many connections dispatch concurrently, so implementations must be
/// `Send + Sync` and must not assume calls are serialized.
///
/// # Contract
///
/// - Called at most once per handler invocation
/// - `result.matched_dn` is always `None` when sent by the default backend
/// - Delivery failures are the sender's concern; the backend never retries
pub trait ResultSender: Send + Sync {
    /// Send a result for `op` to its client
    fn send_result(&self, op: &Operation, result: LdapResult);
}
