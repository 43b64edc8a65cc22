// # defbackend-core
//
// The default (fallback) backend of a directory server request router.
//
// ## Architecture Overview
//
// When the router finds no configured suffix above an operation's target DN,
// it dispatches the operation here. This library provides:
// - **DefaultBackend**: Registration of the backend and its handler set
// - **Handlers**: One responder per operation kind (bind policy, "no such
//   suffix" failures, no-ops, terminal search continuation)
// - **SuffixMessageBuilder**: Synthesizes "No such suffix (...)" diagnostics
// - **DispatchTable**: Kind → handler table the router dispatches through
// - **Collaborator traits**: result delivery, counters, DN explode
//
// ## Design Principles
//
// 1. **No globals**: The backend is an explicit value created at bootstrap
// 2. **Synchronous**: Handlers run on the caller's thread and never block
// 3. **Fail at setup, not at runtime**: Registration returns a Result; the
//    binary decides to exit
// 4. **Library-First**: The daemon is a thin integration layer

pub mod backend;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod dn;
pub mod error;
pub mod handlers;
pub mod message;
pub mod operation;
pub mod result;
pub mod stats;
pub mod traits;

// Re-export core types for convenience
pub use backend::{BackendDescriptor, DefaultBackend, Services};
pub use config::DefaultBackendConfig;
pub use dispatch::DispatchTable;
pub use error::{Error, RegistrationStep, Result};
pub use message::{NO_SUCH_SUFFIX, SuffixMessageBuilder};
pub use operation::{BindMethod, Operation, OperationKind, Outcome};
pub use result::{LdapResult, ResultCode};
pub use traits::{BindCounters, DispatchSink, DnExploder, OperationHandler, ResultSender};
