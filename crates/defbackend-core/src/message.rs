//! "No such suffix" diagnostic synthesis
//!
//! Turns an exploded target DN into the text returned to a client whose
//! request matched no configured suffix:
//!
//! ```text
//! cn=X,dc=bogus,dc=com  =>  No such suffix (dc=bogus,dc=com)
//! cn=X,cn=bogus         =>  No such suffix (cn=bogus)
//! cn=X,z=bogus          =>  No such suffix (z=bogus)
//! cn=X,bogus            =>  No such suffix (bogus)
//! <root DN>             =>  No such suffix
//! ```
//!
//! If the last RDN starts with a repeatable prefix (`dc=` by default), the
//! whole trailing run of RDNs with that prefix is reported. Otherwise only the
//! last RDN is reported, verbatim and unvalidated.

/// Message used when no suffix text can be derived
pub const NO_SUCH_SUFFIX: &str = "No such suffix";

/// Repeatable prefixes used when none are configured
pub const DEFAULT_REPEATABLE_PREFIXES: &[&str] = &["dc="];

/// An RDN prefix whose consecutive occurrences form a single suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatablePrefix {
    prefix: String,
    len: usize,
}

impl RepeatablePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let len = prefix.len();
        Self { prefix, len }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Case-insensitive prefix test
    pub fn matches(&self, rdn: &str) -> bool {
        rdn.get(..self.len)
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
    }
}

/// Builds "No such suffix" diagnostics from exploded DNs
///
/// Stateless apart from the prefix table; share it freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMessageBuilder {
    /// Ordered; the first matching prefix wins
    prefixes: Vec<RepeatablePrefix>,
}

impl SuffixMessageBuilder {
    /// Create a builder with the given repeatable prefix table
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(RepeatablePrefix::new).collect(),
        }
    }

    pub fn prefixes(&self) -> &[RepeatablePrefix] {
        &self.prefixes
    }

    /// Output capacity that always fits the untruncated message for `dn`
    pub fn capacity_for(dn: &str) -> usize {
        dn.len() + NO_SUCH_SUFFIX.len() + 4
    }

    /// Build the diagnostic without a length bound
    pub fn build<S: AsRef<str>>(&self, rdns: &[S]) -> String {
        self.build_bounded(rdns, usize::MAX)
    }

    /// Build the diagnostic, truncated to at most `capacity` bytes
    ///
    /// Truncation happens on a UTF-8 character boundary.
    pub fn build_bounded<S: AsRef<str>>(&self, rdns: &[S], capacity: usize) -> String {
        let Some(last) = rdns.len().checked_sub(1) else {
            return bounded(NO_SUCH_SUFFIX.to_string(), capacity);
        };

        let first = match self.matching_prefix(rdns[last].as_ref()) {
            Some(prefix) => {
                // stop at index 0 even if every RDN carries the prefix
                let mut first = last;
                while first > 0 && prefix.matches(rdns[first - 1].as_ref()) {
                    first -= 1;
                }
                first
            }
            None => last,
        };

        let suffix_len: usize = rdns[first..]
            .iter()
            .map(|rdn| rdn.as_ref().len() + 1)
            .sum();
        let mut text = String::with_capacity(NO_SUCH_SUFFIX.len() + 2 + suffix_len);
        text.push_str(NO_SUCH_SUFFIX);
        text.push_str(" (");
        for (i, rdn) in rdns[first..].iter().enumerate() {
            if i > 0 {
                text.push(',');
            }
            text.push_str(rdn.as_ref());
        }
        text.push(')');

        bounded(text, capacity)
    }

    fn matching_prefix(&self, rdn: &str) -> Option<&RepeatablePrefix> {
        self.prefixes.iter().find(|prefix| prefix.matches(rdn))
    }
}

impl Default for SuffixMessageBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_REPEATABLE_PREFIXES.iter().copied())
    }
}

fn bounded(mut text: String, capacity: usize) -> String {
    if text.len() > capacity {
        let mut end = capacity;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}
