//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal collaborators that let the contract tests
//! observe exactly what the default backend sends, counts and registers.

#![allow(dead_code)]

use defbackend_core::backend::{BackendDescriptor, DefaultBackend, Services};
use defbackend_core::config::DefaultBackendConfig;
use defbackend_core::delivery::MemoryResultSender;
use defbackend_core::dispatch::DispatchTable;
use defbackend_core::dn::Rfc4514Exploder;
use defbackend_core::error::{Error, RegistrationStep, Result};
use defbackend_core::operation::{BindMethod, Operation, OperationKind};
use defbackend_core::stats::AtomicBindCounters;
use defbackend_core::traits::{DispatchSink, DnExploder, OperationHandler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An initialized default backend plus handles on its collaborators
pub struct Harness {
    pub backend: DefaultBackend,
    pub table: DispatchTable,
    pub results: Arc<MemoryResultSender>,
    pub counters: Arc<AtomicBindCounters>,
}

impl Harness {
    /// Initialize with the default configuration
    pub fn new() -> Self {
        Self::with_config(&DefaultBackendConfig::default())
    }

    /// Initialize with the given configuration
    pub fn with_config(config: &DefaultBackendConfig) -> Self {
        let results = Arc::new(MemoryResultSender::new());
        let counters = Arc::new(AtomicBindCounters::new());
        let services = Services::new(results.clone(), counters.clone(), Arc::new(Rfc4514Exploder));

        let mut table = DispatchTable::new();
        let backend = DefaultBackend::initialize(config, services, &mut table)
            .unwrap_or_else(|e| panic!("default backend initializes: {}", e));

        Self {
            backend,
            table,
            results,
            counters,
        }
    }
}

/// Every (method, credentials) pair that is NOT an anonymous bind
pub fn non_anonymous_binds(dn: &str) -> Vec<Operation> {
    vec![
        Operation::bind(Some(dn.to_string()), BindMethod::Simple, b"secret".to_vec()),
        Operation::bind(Some(dn.to_string()), BindMethod::Simple, vec![0]),
        Operation::bind(
            Some(dn.to_string()),
            BindMethod::Sasl {
                mechanism: "EXTERNAL".to_string(),
            },
            Vec::new(),
        ),
        Operation::bind(
            Some(dn.to_string()),
            BindMethod::Sasl {
                mechanism: "DIGEST-MD5".to_string(),
            },
            b"response".to_vec(),
        ),
        Operation::bind(None, BindMethod::Simple, b"secret".to_vec()),
    ]
}

/// A dispatch sink that rejects one registration step
///
/// Every other step is forwarded to an inner [`DispatchTable`]. Only the
/// attach and install steps go through a sink; the create step is reached
/// through configuration validation, so `new` refuses to build an inert sink.
pub struct FailingSink {
    pub fail_at: RegistrationStep,
    pub inner: DispatchTable,
}

impl FailingSink {
    pub fn new(fail_at: RegistrationStep) -> Self {
        assert_ne!(
            fail_at,
            RegistrationStep::CreateBackend,
            "create_backend is not a sink step; use an invalid config"
        );
        Self {
            fail_at,
            inner: DispatchTable::new(),
        }
    }
}

impl DispatchSink for FailingSink {
    fn attach_backend(&mut self, descriptor: Arc<BackendDescriptor>) -> Result<()> {
        if self.fail_at == RegistrationStep::AttachBackend {
            return Err(Error::registration("injected attach failure"));
        }
        self.inner.attach_backend(descriptor)
    }

    fn install_handler(
        &mut self,
        kind: OperationKind,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<()> {
        if self.fail_at == RegistrationStep::InstallHandler(kind) {
            return Err(Error::registration("injected install failure"));
        }
        self.inner.install_handler(kind, handler)
    }
}

/// A DN exploder that always fails, counting calls
#[derive(Default)]
pub struct BrokenExploder {
    calls: AtomicUsize,
}

impl BrokenExploder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DnExploder for BrokenExploder {
    fn explode(&self, dn: &str) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::invalid_dn(format!("cannot explode '{}'", dn)))
    }
}
