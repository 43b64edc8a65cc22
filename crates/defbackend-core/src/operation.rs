//! Operation context types
//!
//! An [`Operation`] is owned by the caller (the router / frontend). Handlers
//! borrow it mutably for the duration of one call: they read the bind method,
//! credentials and target DN, and may write the result text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of operations the router may dispatch to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Bind (authenticate)
    Bind,
    /// Unbind (close the session)
    Unbind,
    /// Search request
    Search,
    /// Fetch the next entry of a running search
    NextSearchEntry,
    /// Compare an attribute value
    Compare,
    /// Modify an entry
    Modify,
    /// Rename (modify RDN) an entry
    #[serde(rename = "modrdn", alias = "rename")]
    ModRdn,
    /// Add an entry
    Add,
    /// Delete an entry
    Delete,
    /// Abandon an outstanding operation
    Abandon,
}

impl OperationKind {
    /// Every operation kind, in dispatch-table order
    pub const ALL: [OperationKind; 10] = [
        OperationKind::Bind,
        OperationKind::Unbind,
        OperationKind::Search,
        OperationKind::NextSearchEntry,
        OperationKind::Compare,
        OperationKind::Modify,
        OperationKind::ModRdn,
        OperationKind::Add,
        OperationKind::Delete,
        OperationKind::Abandon,
    ];

    /// Short lowercase name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Bind => "bind",
            OperationKind::Unbind => "unbind",
            OperationKind::Search => "search",
            OperationKind::NextSearchEntry => "next_search_entry",
            OperationKind::Compare => "compare",
            OperationKind::Modify => "modify",
            OperationKind::ModRdn => "modrdn",
            OperationKind::Add => "add",
            OperationKind::Delete => "delete",
            OperationKind::Abandon => "abandon",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("rename") {
            return Ok(OperationKind::ModRdn);
        }
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::config(format!("Unknown operation kind: {}", s)))
    }
}

/// Bind authentication method
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BindMethod {
    /// Simple (DN + password) bind
    #[default]
    Simple,
    /// SASL bind with the named mechanism
    Sasl {
        /// Mechanism name (e.g. "EXTERNAL", "GSSAPI")
        mechanism: String,
    },
}

/// What a handler reports back to the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The operation was fully handled; do not dispatch further
    Handled,
    /// Anonymous simple bind accepted without establishing an identity
    BindAnonymous,
    /// Bind rejected; a failure result has been sent
    BindFailed,
    /// No search entry is available and no error occurred
    NoEntry,
}

/// Caller-owned operation context
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    conn_id: u64,
    msg_id: i32,
    target_dn: Option<String>,
    bind_method: BindMethod,
    credentials: Vec<u8>,
    result_text: Option<String>,
}

impl Operation {
    /// Create a new operation of the given kind with no target DN
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            conn_id: 0,
            msg_id: 0,
            target_dn: None,
            bind_method: BindMethod::Simple,
            credentials: Vec::new(),
            result_text: None,
        }
    }

    /// Create a bind operation
    pub fn bind(target_dn: Option<String>, method: BindMethod, credentials: Vec<u8>) -> Self {
        Self {
            target_dn,
            bind_method: method,
            credentials,
            ..Self::new(OperationKind::Bind)
        }
    }

    /// Set the target DN
    pub fn with_target_dn(mut self, dn: impl Into<String>) -> Self {
        self.target_dn = Some(dn.into());
        self
    }

    /// Set connection and message identifiers (used for logging)
    pub fn with_ids(mut self, conn_id: u64, msg_id: i32) -> Self {
        self.conn_id = conn_id;
        self.msg_id = msg_id;
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    pub fn msg_id(&self) -> i32 {
        self.msg_id
    }

    /// Target DN of the operation, if any
    pub fn target_dn(&self) -> Option<&str> {
        self.target_dn.as_deref()
    }

    pub fn bind_method(&self) -> &BindMethod {
        &self.bind_method
    }

    /// Bind credentials (may be empty)
    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }

    /// Result text written by a handler, if any
    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    /// Write the result text slot
    pub fn set_result_text(&mut self, text: impl Into<String>) {
        self.result_text = Some(text.into());
    }

    /// True for a simple bind carrying no credentials
    pub fn is_anonymous_bind(&self) -> bool {
        self.kind == OperationKind::Bind
            && self.bind_method == BindMethod::Simple
            && self.credentials.is_empty()
    }
}
