//! LDAP result codes and the result record handed to result delivery

use serde::{Deserialize, Serialize};
use std::fmt;

/// LDAP result codes produced by the default backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultCode {
    /// success (0)
    Success,
    /// referral (10)
    Referral,
    /// noSuchObject (32)
    NoSuchObject,
    /// invalidCredentials (49)
    InvalidCredentials,
}

impl ResultCode {
    /// Numeric protocol value
    pub fn code(&self) -> u32 {
        match self {
            ResultCode::Success => 0,
            ResultCode::Referral => 10,
            ResultCode::NoSuchObject => 32,
            ResultCode::InvalidCredentials => 49,
        }
    }

    /// Protocol name as used in RFC 4511
    pub fn name(&self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Referral => "referral",
            ResultCode::NoSuchObject => "noSuchObject",
            ResultCode::InvalidCredentials => "invalidCredentials",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// A result to be sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapResult {
    /// Result code
    pub code: ResultCode,

    /// Matched DN; the default backend never matches anything
    pub matched_dn: Option<String>,

    /// Diagnostic message
    pub message: Option<String>,

    /// Referral URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referrals: Vec<String>,
}

impl LdapResult {
    /// Create a result with only a code
    pub fn new(code: ResultCode) -> Self {
        Self {
            code,
            matched_dn: None,
            message: None,
            referrals: Vec::new(),
        }
    }

    /// Attach a diagnostic message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach referral URLs
    pub fn with_referrals(mut self, referrals: Vec<String>) -> Self {
        self.referrals = referrals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_protocol_values() {
        assert_eq!(ResultCode::Success.code(), 0);
        assert_eq!(ResultCode::Referral.code(), 10);
        assert_eq!(ResultCode::NoSuchObject.code(), 32);
        assert_eq!(ResultCode::InvalidCredentials.code(), 49);
        assert_eq!(
            ResultCode::InvalidCredentials.to_string(),
            "invalidCredentials (49)"
        );
    }

    #[test]
    fn result_serializes_without_empty_referrals() {
        let result = LdapResult::new(ResultCode::NoSuchObject).with_message("No such suffix");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], "noSuchObject");
        assert_eq!(json["message"], "No such suffix");
        assert!(json["matched_dn"].is_null());
        assert!(json.get("referrals").is_none());
    }
}
