// # Memory Result Sender
//
// In-memory implementation of ResultSender.
//
// ## Purpose
//
// Records every result instead of writing it to a connection. Used by the
// daemon's request replay and by tests to observe exactly what a client
// would have received.

use std::sync::Mutex;

use crate::operation::{Operation, OperationKind};
use crate::result::LdapResult;
use crate::traits::ResultSender;

/// A result captured by [`MemoryResultSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentResult {
    /// Connection the result was addressed to
    pub conn_id: u64,
    /// Message id of the operation
    pub msg_id: i32,
    /// Kind of the operation
    pub kind: OperationKind,
    /// The result itself
    pub result: LdapResult,
}

/// In-memory result sender
///
/// # Example
///
/// ```rust
/// use defbackend_core::delivery::MemoryResultSender;
/// use defbackend_core::operation::{Operation, OperationKind};
/// use defbackend_core::result::{LdapResult, ResultCode};
/// use defbackend_core::traits::ResultSender;
///
/// let sender = MemoryResultSender::new();
/// let op = Operation::new(OperationKind::Search);
/// sender.send_result(&op, LdapResult::new(ResultCode::NoSuchObject));
///
/// let sent = sender.take();
/// assert_eq!(sent.len(), 1);
/// assert_eq!(sent[0].result.code, ResultCode::NoSuchObject);
/// assert!(sender.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryResultSender {
    sent: Mutex<Vec<SentResult>>,
}

impl MemoryResultSender {
    /// Create a new empty sender
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results recorded so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of all recorded results
    pub fn sent(&self) -> Vec<SentResult> {
        self.lock().clone()
    }

    /// Remove and return all recorded results
    pub fn take(&self) -> Vec<SentResult> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SentResult>> {
        // a poisoned recorder still holds valid results
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResultSender for MemoryResultSender {
    fn send_result(&self, op: &Operation, result: LdapResult) {
        self.lock().push(SentResult {
            conn_id: op.conn_id(),
            msg_id: op.msg_id(),
            kind: op.kind(),
            result,
        });
    }
}
