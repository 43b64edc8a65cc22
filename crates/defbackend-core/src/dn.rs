//! String DN splitting
//!
//! [`Rfc4514Exploder`] splits a DN string into RDN strings without
//! interpreting attribute types or values. It is deliberately lenient: a
//! component without `=` (e.g. `bogus`) is returned as-is so the diagnostic
//! can echo it back to the client.

use crate::error::{Error, Result};
use crate::traits::DnExploder;

/// Splits DNs on unescaped, unquoted `,` (or the legacy `;`) separators
///
/// - `\` escapes the next character (the escape is kept in the output)
/// - `"..."` quoted values may contain separators
/// - whitespace around components is dropped unless escaped or quoted
/// - an empty or all-whitespace DN is the root DN and explodes to no RDNs
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc4514Exploder;

impl Rfc4514Exploder {
    pub fn new() -> Self {
        Self
    }
}

impl DnExploder for Rfc4514Exploder {
    fn explode(&self, dn: &str) -> Result<Vec<String>> {
        if dn.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut rdns = Vec::new();
        let mut current = String::new();
        // bytes of `current` that trailing-whitespace trimming must keep
        let mut keep = 0;
        let mut escaped = false;
        let mut quoted = false;

        for c in dn.chars() {
            if escaped {
                current.push(c);
                keep = current.len();
                escaped = false;
                continue;
            }

            match c {
                '\\' => {
                    current.push(c);
                    escaped = true;
                }
                '"' => {
                    current.push(c);
                    quoted = !quoted;
                    keep = current.len();
                }
                ',' | ';' if !quoted => {
                    rdns.push(finish_rdn(&mut current, keep, dn)?);
                    keep = 0;
                }
                c if c.is_whitespace() && current.is_empty() => {}
                c => {
                    current.push(c);
                    if quoted {
                        keep = current.len();
                    }
                }
            }
        }

        if escaped {
            return Err(Error::invalid_dn(format!("trailing escape in '{}'", dn)));
        }
        if quoted {
            return Err(Error::invalid_dn(format!("unterminated quote in '{}'", dn)));
        }

        rdns.push(finish_rdn(&mut current, keep, dn)?);
        Ok(rdns)
    }
}

fn finish_rdn(current: &mut String, keep: usize, dn: &str) -> Result<String> {
    let end = keep.max(current.trim_end().len());
    current.truncate(end);
    if current.is_empty() {
        return Err(Error::invalid_dn(format!("empty RDN in '{}'", dn)));
    }
    Ok(std::mem::take(current))
}
