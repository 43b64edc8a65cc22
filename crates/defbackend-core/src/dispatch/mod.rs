//! Operation dispatch table
//!
//! The table maps each [`OperationKind`] to the handler installed for it by a
//! backend. It is filled once during bootstrap through [`DispatchSink`] and
//! only read afterwards, so lookups need no locking.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use defbackend_core::backend::{DefaultBackend, Services};
//! use defbackend_core::config::DefaultBackendConfig;
//! use defbackend_core::delivery::MemoryResultSender;
//! use defbackend_core::dispatch::DispatchTable;
//! use defbackend_core::dn::Rfc4514Exploder;
//! use defbackend_core::operation::{Operation, OperationKind, Outcome};
//! use defbackend_core::stats::AtomicBindCounters;
//!
//! # fn main() -> defbackend_core::Result<()> {
//! let services = Services::new(
//!     Arc::new(MemoryResultSender::new()),
//!     Arc::new(AtomicBindCounters::new()),
//!     Arc::new(Rfc4514Exploder),
//! );
//! let mut table = DispatchTable::new();
//! DefaultBackend::initialize(&DefaultBackendConfig::default(), services, &mut table)?;
//!
//! let mut op = Operation::new(OperationKind::Unbind);
//! assert_eq!(table.dispatch(&mut op)?, Outcome::Handled);
//! # Ok(())
//! # }
//! ```

use crate::backend::BackendDescriptor;
use crate::error::{Error, Result};
use crate::operation::{Operation, OperationKind, Outcome};
use crate::traits::{DispatchSink, OperationHandler};
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatch table for one backend
#[derive(Default)]
pub struct DispatchTable {
    /// Backend the installed handlers belong to
    backend: Option<Arc<BackendDescriptor>>,

    /// Installed handlers, one per operation kind
    handlers: HashMap<OperationKind, Arc<dyn OperationHandler>>,
}

impl DispatchTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of the attached backend, if any
    pub fn backend(&self) -> Option<&Arc<BackendDescriptor>> {
        self.backend.as_ref()
    }

    /// Dispatch an operation to the handler installed for its kind
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: What the handler reported
    /// - `Err(Error::Dispatch)`: If no handler is installed for the kind
    pub fn dispatch(&self, op: &mut Operation) -> Result<Outcome> {
        let handler = self
            .handlers
            .get(&op.kind())
            .ok_or(Error::Dispatch(op.kind()))?;

        Ok(handler.handle(op))
    }

    /// Check if a handler is installed for an operation kind
    pub fn has_handler(&self, kind: OperationKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// List all operation kinds with an installed handler, in table order
    pub fn list_operations(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| self.has_handler(*kind))
            .collect()
    }

    /// List operation kinds that still lack a handler
    pub fn missing_operations(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| !self.has_handler(*kind))
            .collect()
    }

    /// True once every operation kind has a handler
    pub fn is_complete(&self) -> bool {
        self.missing_operations().is_empty()
    }
}

impl DispatchSink for DispatchTable {
    fn attach_backend(&mut self, descriptor: Arc<BackendDescriptor>) -> Result<()> {
        if let Some(existing) = &self.backend {
            return Err(Error::registration(format!(
                "backend '{}' is already attached",
                existing.name
            )));
        }
        self.backend = Some(descriptor);
        Ok(())
    }

    fn install_handler(
        &mut self,
        kind: OperationKind,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<()> {
        if self.backend.is_none() {
            return Err(Error::registration(format!(
                "cannot install {} handler before a backend is attached",
                kind
            )));
        }
        if self.handlers.contains_key(&kind) {
            return Err(Error::registration(format!(
                "a {} handler is already installed",
                kind
            )));
        }
        self.handlers.insert(kind, handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHandler(Outcome);

    impl OperationHandler for FixedHandler {
        fn handle(&self, _op: &mut Operation) -> Outcome {
            self.0
        }

        fn handler_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn attached_table() -> DispatchTable {
        let mut table = DispatchTable::new();
        table
            .attach_backend(Arc::new(BackendDescriptor::default_backend()))
            .unwrap();
        table
    }

    #[test]
    fn test_handler_installation() {
        let mut table = attached_table();

        // Initially empty
        assert!(!table.has_handler(OperationKind::Add));
        assert_eq!(table.missing_operations().len(), OperationKind::ALL.len());

        // Install
        table
            .install_handler(OperationKind::Add, Arc::new(FixedHandler(Outcome::Handled)))
            .unwrap();

        // Now present
        assert!(table.has_handler(OperationKind::Add));
        assert_eq!(table.list_operations(), vec![OperationKind::Add]);
        assert!(!table.is_complete());
    }

    #[test]
    fn duplicate_installation_is_rejected() {
        let mut table = attached_table();
        let handler: Arc<dyn OperationHandler> = Arc::new(FixedHandler(Outcome::Handled));

        table
            .install_handler(OperationKind::Bind, Arc::clone(&handler))
            .unwrap();
        let err = table
            .install_handler(OperationKind::Bind, handler)
            .unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
    }

    #[test]
    fn installation_requires_attached_backend() {
        let mut table = DispatchTable::new();
        let err = table
            .install_handler(OperationKind::Bind, Arc::new(FixedHandler(Outcome::Handled)))
            .unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
    }

    #[test]
    fn second_backend_is_rejected() {
        let mut table = attached_table();
        let err = table
            .attach_backend(Arc::new(BackendDescriptor::default_backend()))
            .unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
    }

    #[test]
    fn dispatch_reaches_installed_handler() {
        let mut table = attached_table();
        table
            .install_handler(
                OperationKind::NextSearchEntry,
                Arc::new(FixedHandler(Outcome::NoEntry)),
            )
            .unwrap();

        let mut op = Operation::new(OperationKind::NextSearchEntry);
        assert_eq!(table.dispatch(&mut op).unwrap(), Outcome::NoEntry);

        let mut missing = Operation::new(OperationKind::Compare);
        assert!(matches!(
            table.dispatch(&mut missing),
            Err(Error::Dispatch(OperationKind::Compare))
        ));
    }
}
