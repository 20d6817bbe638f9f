//! Authorization gate for mutating catalog operations.
//!
//! Every add, update, rename, and delete must pass a credential check against
//! a fixed admin triple before it executes. The denial messages are
//! deliberately uninformative: they never say which field was wrong, which
//! fields are expected, or what the format looks like. That anti-enumeration
//! property is the point of this module, not an error-path afterthought.
//!
//! The gate is stateless. There is no lockout, rate limiting, or attempt
//! counting; every call is evaluated on its own.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// The configured admin identity the gate checks against.
#[derive(Clone)]
pub struct AdminIdentity {
    pub full_name: String,
    pub email: String,
    pub passphrase: SecretString,
}

/// Credential fields the caller chose to include with a request.
///
/// All fields are optional: the gate, not the transport, decides what an
/// omission means.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialAttempt {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub passphrase: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny { message: &'static str },
}

impl GateDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Denial for an incomplete credential set. Must not name the expected fields.
pub const DENIED_INCOMPLETE: &str =
    "I cannot process this request without complete and valid authorization.";

/// Denial when all fields were supplied but at least one did not match. Must
/// not reveal which one.
pub const DENIED_MISMATCH: &str =
    "It seems you do not have the right authorization, so I cannot do that.";

/// Refusal for requests that probe the authorization requirements or format.
pub const DENIED_PROBE: &str =
    "I cannot share any details about the authorization requirements.";

pub struct AuthorizationGate {
    identity: AdminIdentity,
}

impl AuthorizationGate {
    pub fn new(identity: AdminIdentity) -> Self {
        Self { identity }
    }

    /// Evaluates one credential attempt.
    ///
    /// Full name and email are compared case-insensitively after trimming;
    /// the passphrase is compared case-sensitively. A blank field counts as
    /// missing, so an empty string cannot distinguish "field rejected" from
    /// "field omitted" for a caller enumerating the requirements.
    pub fn evaluate(&self, attempt: &CredentialAttempt) -> GateDecision {
        let full_name = attempt.full_name.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let email = attempt.email.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let passphrase = attempt.passphrase.as_deref().map(str::trim).filter(|v| !v.is_empty());

        let (Some(full_name), Some(email), Some(passphrase)) = (full_name, email, passphrase)
        else {
            return GateDecision::Deny { message: DENIED_INCOMPLETE };
        };

        let name_ok = full_name.eq_ignore_ascii_case(self.identity.full_name.trim());
        let email_ok = email.eq_ignore_ascii_case(self.identity.email.trim());
        let passphrase_ok = passphrase == self.identity.passphrase.expose_secret().trim();

        if name_ok && email_ok && passphrase_ok {
            GateDecision::Allow
        } else {
            GateDecision::Deny { message: DENIED_MISMATCH }
        }
    }

    /// The fixed refusal used when a caller asks what the credentials are.
    pub fn probe_refusal() -> &'static str {
        DENIED_PROBE
    }
}
