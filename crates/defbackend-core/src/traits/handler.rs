// # Operation Handler and Dispatch Sink Traits
//
// A backend exposes one `OperationHandler` per `OperationKind`. During
// registration the backend installs its handlers into a `DispatchSink`, which
// is owned by the router.
//
// ## Usage
//
// ```rust,ignore
// let mut table = DispatchTable::new();
// let backend = DefaultBackend::initialize(&config, services, &mut table)?;
//
// // Later, for a request whose target DN matches no suffix:
// let outcome = table.dispatch(&mut op)?;
// ```

use crate::backend::BackendDescriptor;
use crate::error::Result;
use crate::operation::{Operation, Outcome, OperationKind};
use std::sync::Arc;

/// Trait for a single operation handler
///
/// # Contract
///
/// - Runs synchronously on the caller's thread; never spawns or blocks
/// - Must be safe to call concurrently from many connections
/// - Cannot fail procedurally: every client-visible failure is sent through
///   the result sender and reflected in the returned [`Outcome`]
pub trait OperationHandler: Send + Sync {
    /// Handle one operation
    fn handle(&self, op: &mut Operation) -> Outcome;

    /// Handler name (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}

/// Trait for the router-owned registration sink
///
/// Either method may refuse the registration, in which case backend setup
/// aborts.
pub trait DispatchSink {
    /// Attach the backend descriptor the handlers belong to
    fn attach_backend(&mut self, descriptor: Arc<BackendDescriptor>) -> Result<()>;

    /// Install the handler for one operation kind
    fn install_handler(
        &mut self,
        kind: OperationKind,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<()>;
}
