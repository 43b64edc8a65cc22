//! Default backend registration
//!
//! The default backend is the backend of last resort: the router hands it
//! every request whose target DN falls under none of the configured
//! suffixes. It holds no entries and answers everything with a well-formed
//! failure, except anonymous simple binds which it accepts.
//!
//! ## Lifecycle
//!
//! 1. Build [`Services`] from the server's collaborators
//! 2. Call [`DefaultBackend::initialize()`] once during bootstrap
//! 3. On `Err`, the entry point terminates the process; a partially
//!    installed fallback backend must never serve requests
//! 4. Pass the returned [`DefaultBackend`] handle to whoever needs the
//!    descriptor

use crate::config::DefaultBackendConfig;
use crate::error::{Error, RegistrationStep, Result};
use crate::handlers::HandlerSet;
use crate::operation::OperationKind;
use crate::traits::{BindCounters, DispatchSink, DnExploder, ResultSender};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, trace};

/// Type and name of the default backend
pub const DEFBACKEND_TYPE: &str = "default";

/// Immutable identity of a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendDescriptor {
    /// Backend type
    pub backend_type: String,
    /// Backend instance name
    pub name: String,
    /// Private backends are hidden from clients (no root DSE naming context)
    pub is_private: bool,
    /// Whether changes are written to the changelog
    pub log_changes: bool,
    /// Managed as if it held remote data
    pub remote_data: bool,
}

impl BackendDescriptor {
    /// Create a descriptor with no flags set beyond the given ones
    pub fn new(
        backend_type: impl Into<String>,
        name: impl Into<String>,
        is_private: bool,
        log_changes: bool,
    ) -> Self {
        Self {
            backend_type: backend_type.into(),
            name: name.into(),
            is_private,
            log_changes,
            remote_data: false,
        }
    }

    /// Mark the backend as holding remote data
    pub fn with_remote_data(mut self) -> Self {
        self.remote_data = true;
        self
    }

    /// The default backend's identity
    pub fn default_backend() -> Self {
        Self::new(DEFBACKEND_TYPE, DEFBACKEND_TYPE, true, false).with_remote_data()
    }
}

/// Collaborators the default backend's handlers depend on
#[derive(Clone)]
pub struct Services {
    /// Result delivery to clients
    pub results: Arc<dyn ResultSender>,
    /// Bind statistics
    pub counters: Arc<dyn BindCounters>,
    /// DN splitting
    pub exploder: Arc<dyn DnExploder>,
}

impl Services {
    pub fn new(
        results: Arc<dyn ResultSender>,
        counters: Arc<dyn BindCounters>,
        exploder: Arc<dyn DnExploder>,
    ) -> Self {
        Self {
            results,
            counters,
            exploder,
        }
    }
}

/// Handle to the initialized default backend
///
/// There is no global instance: the value returned by
/// [`DefaultBackend::initialize()`] is the only one, and it is threaded
/// explicitly to the components that need it.
pub struct DefaultBackend {
    descriptor: Arc<BackendDescriptor>,
    services: Services,
}

impl DefaultBackend {
    /// Create the default backend and install its handlers into `sink`
    ///
    /// Not idempotent: a sink that already has a backend attached rejects
    /// the second registration.
    ///
    /// # Returns
    ///
    /// - `Ok(DefaultBackend)`: Every operation kind has a handler in `sink`
    /// - `Err(Error::Setup)`: Naming the step that failed; the caller must
    ///   not continue with the sink
    pub fn initialize(
        config: &DefaultBackendConfig,
        services: Services,
        sink: &mut dyn DispatchSink,
    ) -> Result<Self> {
        trace!("defbackend_init");

        match Self::register(config, &services, sink) {
            Ok(descriptor) => {
                info!(
                    "Default backend '{}' installed ({} operation handlers)",
                    descriptor.name,
                    OperationKind::ALL.len()
                );
                Ok(Self {
                    descriptor,
                    services,
                })
            }
            Err(e) => {
                error!("defbackend_init: failed ({})", e);
                Err(e)
            }
        }
    }

    fn register(
        config: &DefaultBackendConfig,
        services: &Services,
        sink: &mut dyn DispatchSink,
    ) -> Result<Arc<BackendDescriptor>> {
        config
            .validate()
            .map_err(|e| Error::setup(RegistrationStep::CreateBackend, e.to_string()))?;
        let descriptor = Arc::new(BackendDescriptor::default_backend());

        sink.attach_backend(Arc::clone(&descriptor))
            .map_err(|e| Error::setup(RegistrationStep::AttachBackend, e.to_string()))?;

        let handlers = HandlerSet::new(services, config);
        for kind in OperationKind::ALL {
            sink.install_handler(kind, handlers.handler(kind))
                .map_err(|e| Error::setup(RegistrationStep::InstallHandler(kind), e.to_string()))?;
        }

        Ok(descriptor)
    }

    /// The backend descriptor; always present once initialized
    pub fn descriptor(&self) -> &Arc<BackendDescriptor> {
        &self.descriptor
    }

    /// Collaborators the handlers were built with
    pub fn services(&self) -> &Services {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MemoryResultSender;
    use crate::dispatch::DispatchTable;
    use crate::dn::Rfc4514Exploder;
    use crate::stats::AtomicBindCounters;

    fn services() -> Services {
        Services::new(
            Arc::new(MemoryResultSender::new()),
            Arc::new(AtomicBindCounters::new()),
            Arc::new(Rfc4514Exploder),
        )
    }

    #[test]
    fn default_descriptor_identity() {
        let descriptor = BackendDescriptor::default_backend();
        assert_eq!(descriptor.backend_type, "default");
        assert_eq!(descriptor.name, "default");
        assert!(descriptor.is_private);
        assert!(!descriptor.log_changes);
        assert!(descriptor.remote_data);
    }

    #[test]
    fn initialize_fills_the_table() {
        let mut table = DispatchTable::new();
        let backend =
            DefaultBackend::initialize(&DefaultBackendConfig::default(), services(), &mut table)
                .unwrap();

        assert!(table.is_complete());
        assert_eq!(table.list_operations(), OperationKind::ALL.to_vec());
        assert!(Arc::ptr_eq(backend.descriptor(), table.backend().unwrap()));
    }

    #[test]
    fn initialize_twice_into_same_table_fails() {
        let mut table = DispatchTable::new();
        DefaultBackend::initialize(&DefaultBackendConfig::default(), services(), &mut table)
            .unwrap();

        let err = DefaultBackend::initialize(&DefaultBackendConfig::default(), services(), &mut table)
            .err()
            .unwrap();
        assert_eq!(err.setup_step(), Some(RegistrationStep::AttachBackend));
    }

    #[test]
    fn invalid_config_fails_at_create_step() {
        let config = DefaultBackendConfig::new()
            .with_default_referrals(vec!["http://not-ldap".to_string()]);
        let mut table = DispatchTable::new();

        let err = DefaultBackend::initialize(&config, services(), &mut table)
            .err()
            .unwrap();
        assert_eq!(err.setup_step(), Some(RegistrationStep::CreateBackend));
        assert!(table.backend().is_none());
    }
}
