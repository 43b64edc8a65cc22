// Startup fault injection
//
// `DEFBACKEND_INJECT_SETUP_FAILURE` names one registration step that the
// daemon's dispatch sink refuses. It exists so operators and tests can check
// that a broken fallback backend stops the daemon instead of serving.

use defbackend_core::error::{Error, RegistrationStep, Result};
use defbackend_core::{BackendDescriptor, DispatchSink, DispatchTable, OperationHandler, OperationKind};
use std::sync::Arc;

/// Dispatch sink that forwards to a [`DispatchTable`], optionally refusing
/// one registration step
pub struct BootstrapSink {
    table: DispatchTable,
    fail_at: Option<RegistrationStep>,
}

impl BootstrapSink {
    pub fn new(fail_at: Option<RegistrationStep>) -> Self {
        Self {
            table: DispatchTable::new(),
            fail_at,
        }
    }

    /// The filled table
    pub fn into_table(self) -> DispatchTable {
        self.table
    }

    /// Gate for the create step, run before the backend is initialized
    ///
    /// The create step happens inside the backend, ahead of any sink call,
    /// so the sink cannot refuse it from `attach_backend`.
    pub fn create_backend(&self) -> Result<()> {
        if self.fail_at == Some(RegistrationStep::CreateBackend) {
            return Err(Error::setup(
                RegistrationStep::CreateBackend,
                "refused by DEFBACKEND_INJECT_SETUP_FAILURE",
            ));
        }
        Ok(())
    }

    fn check(&self, step: RegistrationStep) -> Result<()> {
        if self.fail_at == Some(step) {
            return Err(Error::registration(format!(
                "{} refused by DEFBACKEND_INJECT_SETUP_FAILURE",
                step
            )));
        }
        Ok(())
    }
}

impl DispatchSink for BootstrapSink {
    fn attach_backend(&mut self, descriptor: Arc<BackendDescriptor>) -> Result<()> {
        self.check(RegistrationStep::AttachBackend)?;
        self.table.attach_backend(descriptor)
    }

    fn install_handler(
        &mut self,
        kind: OperationKind,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<()> {
        self.check(RegistrationStep::InstallHandler(kind))?;
        self.table.install_handler(kind, handler)
    }
}
