// # DN Exploder Trait
//
// Splits a DN string into its RDN components, most specific first.
//
// ## Implementations
//
// - RFC 4514 string splitter: `crate::dn::Rfc4514Exploder`

use crate::error::Result;

/// Trait for DN explode implementations
pub trait DnExploder: Send + Sync {
    /// Explode `dn` into RDN strings
    ///
    /// # Returns
    ///
    /// - `Ok(vec![])` for the empty (root) DN
    /// - `Ok(rdns)` with the most specific RDN first and the suffix last
    /// - `Err(Error::InvalidDn)` if the string cannot be split
    fn explode(&self, dn: &str) -> Result<Vec<String>>;
}
