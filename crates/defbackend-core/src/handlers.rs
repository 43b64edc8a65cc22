//! Handlers for requests whose target matches no suffix
//!
//! | Operation                                        | Handler                    | Result sent            |
//! |--------------------------------------------------|----------------------------|------------------------|
//! | bind                                             | [`BindResponder`]          | invalidCredentials (*) |
//! | search, compare, modify, modrdn, add, delete     | [`UnhandledResponder`]     | noSuchObject/referral  |
//! | next search entry                                | [`NextSearchEntryResponder`] | none                 |
//! | unbind, abandon                                  | [`NoopResponder`]          | none                   |
//!
//! (*) anonymous simple binds are accepted and nothing is sent.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::backend::Services;
use crate::config::DefaultBackendConfig;
use crate::message::{NO_SUCH_SUFFIX, SuffixMessageBuilder};
use crate::operation::{BindMethod, Operation, OperationKind, Outcome};
use crate::result::{LdapResult, ResultCode};
use crate::traits::{BindCounters, DnExploder, OperationHandler, ResultSender};

/// Answers any operation with a "no such suffix" failure
pub struct UnhandledResponder {
    results: Arc<dyn ResultSender>,
    referrals: Vec<String>,
}

impl UnhandledResponder {
    pub fn new(results: Arc<dyn ResultSender>, referrals: Vec<String>) -> Self {
        Self { results, referrals }
    }

    fn no_backend_result(&self) -> LdapResult {
        if self.referrals.is_empty() {
            LdapResult::new(ResultCode::NoSuchObject).with_message(NO_SUCH_SUFFIX)
        } else {
            LdapResult::new(ResultCode::Referral).with_referrals(self.referrals.clone())
        }
    }
}

impl OperationHandler for UnhandledResponder {
    fn handle(&self, op: &mut Operation) -> Outcome {
        trace!(
            "defbackend_default: {} conn={} op={}",
            op.kind(),
            op.conn_id(),
            op.msg_id()
        );

        self.results.send_result(op, self.no_backend_result());
        Outcome::Handled
    }

    fn handler_name(&self) -> &'static str {
        "unhandled"
    }
}

/// Absorbs operations that need no response
pub struct NoopResponder {
    name: &'static str,
}

impl NoopResponder {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl OperationHandler for NoopResponder {
    fn handle(&self, op: &mut Operation) -> Outcome {
        trace!("defbackend_{}: conn={} op={}", self.name, op.conn_id(), op.msg_id());
        Outcome::Handled
    }

    fn handler_name(&self) -> &'static str {
        self.name
    }
}

/// Terminates search iteration: there are never any entries
pub struct NextSearchEntryResponder;

impl OperationHandler for NextSearchEntryResponder {
    fn handle(&self, op: &mut Operation) -> Outcome {
        trace!(
            "defbackend_next_search_entry: conn={} op={}",
            op.conn_id(),
            op.msg_id()
        );
        Outcome::NoEntry
    }

    fn handler_name(&self) -> &'static str {
        "next_search_entry"
    }
}

/// Bind policy of the default backend
///
/// Simple binds without credentials are accepted as anonymous, without
/// setting a bind identity on the connection: no access is ever granted on
/// the strength of such a bind. Every other bind is rejected with
/// invalidCredentials and a diagnostic naming the unknown suffix.
pub struct BindResponder {
    results: Arc<dyn ResultSender>,
    counters: Arc<dyn BindCounters>,
    exploder: Arc<dyn DnExploder>,
    messages: SuffixMessageBuilder,
}

impl BindResponder {
    pub fn new(
        results: Arc<dyn ResultSender>,
        counters: Arc<dyn BindCounters>,
        exploder: Arc<dyn DnExploder>,
        messages: SuffixMessageBuilder,
    ) -> Self {
        Self {
            results,
            counters,
            exploder,
            messages,
        }
    }

    /// Diagnostic for a rejected bind against `dn`
    ///
    /// Falls back to the bare "No such suffix" text when there is no DN, the
    /// DN is the root DN, or it cannot be exploded.
    pub fn rejection_text(&self, dn: Option<&str>) -> String {
        let Some(dn) = dn else {
            return NO_SUCH_SUFFIX.to_string();
        };

        match self.exploder.explode(dn) {
            Ok(rdns) if !rdns.is_empty() => self
                .messages
                .build_bounded(&rdns, SuffixMessageBuilder::capacity_for(dn)),
            Ok(_) => NO_SUCH_SUFFIX.to_string(),
            Err(e) => {
                debug!("Cannot explode bind DN, using generic message: {}", e);
                NO_SUCH_SUFFIX.to_string()
            }
        }
    }
}

impl OperationHandler for BindResponder {
    fn handle(&self, op: &mut Operation) -> Outcome {
        trace!("defbackend_bind: conn={} op={}", op.conn_id(), op.msg_id());

        if *op.bind_method() == BindMethod::Simple && op.credentials().is_empty() {
            self.counters.increment_anonymous_binds();
            return Outcome::BindAnonymous;
        }

        let text = self.rejection_text(op.target_dn());
        op.set_result_text(text.clone());
        self.results.send_result(
            op,
            LdapResult::new(ResultCode::InvalidCredentials).with_message(text),
        );
        Outcome::BindFailed
    }

    fn handler_name(&self) -> &'static str {
        "bind"
    }
}

/// The complete set of handlers installed by the default backend
pub struct HandlerSet {
    bind: Arc<dyn OperationHandler>,
    unhandled: Arc<dyn OperationHandler>,
    next_search_entry: Arc<dyn OperationHandler>,
    unbind: Arc<dyn OperationHandler>,
    abandon: Arc<dyn OperationHandler>,
}

impl HandlerSet {
    /// Build the handlers from collaborators and configuration
    pub fn new(services: &Services, config: &DefaultBackendConfig) -> Self {
        let messages = SuffixMessageBuilder::new(config.repeatable_prefixes.iter().cloned());

        Self {
            bind: Arc::new(BindResponder::new(
                Arc::clone(&services.results),
                Arc::clone(&services.counters),
                Arc::clone(&services.exploder),
                messages,
            )),
            unhandled: Arc::new(UnhandledResponder::new(
                Arc::clone(&services.results),
                config.default_referrals.clone(),
            )),
            next_search_entry: Arc::new(NextSearchEntryResponder),
            unbind: Arc::new(NoopResponder::new("noop")),
            abandon: Arc::new(NoopResponder::new("abandon")),
        }
    }

    /// Handler for an operation kind
    ///
    /// The match is exhaustive: adding an [`OperationKind`] does not compile
    /// until it is given a handler here.
    pub fn handler(&self, kind: OperationKind) -> Arc<dyn OperationHandler> {
        let handler = match kind {
            OperationKind::Bind => &self.bind,
            OperationKind::Unbind => &self.unbind,
            OperationKind::Abandon => &self.abandon,
            OperationKind::NextSearchEntry => &self.next_search_entry,
            OperationKind::Search
            | OperationKind::Compare
            | OperationKind::Modify
            | OperationKind::ModRdn
            | OperationKind::Add
            | OperationKind::Delete => &self.unhandled,
        };
        Arc::clone(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MemoryResultSender;
    use crate::dn::Rfc4514Exploder;
    use crate::stats::AtomicBindCounters;

    struct Fixture {
        results: Arc<MemoryResultSender>,
        counters: Arc<AtomicBindCounters>,
        bind: BindResponder,
    }

    fn fixture() -> Fixture {
        let results = Arc::new(MemoryResultSender::new());
        let counters = Arc::new(AtomicBindCounters::new());
        let bind = BindResponder::new(
            results.clone(),
            counters.clone(),
            Arc::new(Rfc4514Exploder),
            SuffixMessageBuilder::default(),
        );
        Fixture {
            results,
            counters,
            bind,
        }
    }

    #[test]
    fn anonymous_bind_is_counted_and_not_answered() {
        let f = fixture();
        let mut op = Operation::bind(
            Some("cn=X,dc=bogus,dc=com".to_string()),
            BindMethod::Simple,
            Vec::new(),
        );

        assert_eq!(f.bind.handle(&mut op), Outcome::BindAnonymous);
        assert_eq!(f.counters.anonymous_binds(), 1);
        assert!(f.results.is_empty());
        assert_eq!(op.result_text(), None);
    }

    #[test]
    fn password_bind_is_rejected_with_suffix_text() {
        let f = fixture();
        let mut op = Operation::bind(
            Some("cn=X,dc=bogus,dc=com".to_string()),
            BindMethod::Simple,
            b"secret".to_vec(),
        );

        assert_eq!(f.bind.handle(&mut op), Outcome::BindFailed);
        assert_eq!(f.counters.anonymous_binds(), 0);

        let sent = f.results.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result.code, ResultCode::InvalidCredentials);
        assert_eq!(sent[0].result.matched_dn, None);
        assert_eq!(
            sent[0].result.message.as_deref(),
            Some("No such suffix (dc=bogus,dc=com)")
        );
        assert_eq!(op.result_text(), Some("No such suffix (dc=bogus,dc=com)"));
    }

    #[test]
    fn sasl_bind_without_credentials_is_rejected() {
        let f = fixture();
        let mut op = Operation::bind(
            Some("uid=a,ou=people,o=corp".to_string()),
            BindMethod::Sasl {
                mechanism: "EXTERNAL".to_string(),
            },
            Vec::new(),
        );

        assert_eq!(f.bind.handle(&mut op), Outcome::BindFailed);
        assert_eq!(f.counters.anonymous_binds(), 0);
        assert_eq!(
            f.results.sent()[0].result.message.as_deref(),
            Some("No such suffix (o=corp)")
        );
    }

    #[test]
    fn rejection_text_falls_back_without_usable_dn() {
        let f = fixture();
        assert_eq!(f.bind.rejection_text(None), NO_SUCH_SUFFIX);
        assert_eq!(f.bind.rejection_text(Some("")), NO_SUCH_SUFFIX);
        assert_eq!(f.bind.rejection_text(Some("cn=a,,o=b")), NO_SUCH_SUFFIX);
        assert_eq!(f.bind.rejection_text(Some("cn=X,bogus")), "No such suffix (bogus)");
    }

    #[test]
    fn unhandled_sends_no_such_object_without_referrals() {
        let results = Arc::new(MemoryResultSender::new());
        let responder = UnhandledResponder::new(results.clone(), Vec::new());
        let mut op = Operation::new(OperationKind::Modify).with_target_dn("cn=x,o=y");

        assert_eq!(responder.handle(&mut op), Outcome::Handled);

        let sent = results.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result.code, ResultCode::NoSuchObject);
        assert_eq!(sent[0].result.message.as_deref(), Some(NO_SUCH_SUFFIX));
        assert!(sent[0].result.referrals.is_empty());
    }

    #[test]
    fn unhandled_refers_to_default_referrals() {
        let results = Arc::new(MemoryResultSender::new());
        let referrals = vec!["ldap://upstream.example.com".to_string()];
        let responder = UnhandledResponder::new(results.clone(), referrals.clone());
        let mut op = Operation::new(OperationKind::Search);

        assert_eq!(responder.handle(&mut op), Outcome::Handled);

        let sent = results.take();
        assert_eq!(sent[0].result.code, ResultCode::Referral);
        assert_eq!(sent[0].result.referrals, referrals);
        assert_eq!(sent[0].result.matched_dn, None);
    }

    #[test]
    fn next_search_entry_never_yields() {
        let mut op = Operation::new(OperationKind::NextSearchEntry);
        for _ in 0..3 {
            assert_eq!(NextSearchEntryResponder.handle(&mut op), Outcome::NoEntry);
        }
    }

    #[test]
    fn handler_set_covers_every_kind() {
        let services = Services::new(
            Arc::new(MemoryResultSender::new()),
            Arc::new(AtomicBindCounters::new()),
            Arc::new(Rfc4514Exploder),
        );
        let set = HandlerSet::new(&services, &DefaultBackendConfig::default());

        assert_eq!(set.handler(OperationKind::Bind).handler_name(), "bind");
        assert_eq!(set.handler(OperationKind::Unbind).handler_name(), "noop");
        assert_eq!(set.handler(OperationKind::Abandon).handler_name(), "abandon");
        assert_eq!(
            set.handler(OperationKind::NextSearchEntry).handler_name(),
            "next_search_entry"
        );
        for kind in [
            OperationKind::Search,
            OperationKind::Compare,
            OperationKind::Modify,
            OperationKind::ModRdn,
            OperationKind::Add,
            OperationKind::Delete,
        ] {
            assert_eq!(set.handler(kind).handler_name(), "unhandled");
        }
    }
}
