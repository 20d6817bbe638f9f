//! Credential-probe detection.
//!
//! The assistant must never describe what authorization looks like, so
//! messages fishing for the admin credentials are short-circuited before any
//! model or tool sees them. Detection is plain keyword matching over the
//! lowercased message; false negatives fall through to the gate itself, which
//! denies with the same anti-enumeration messages.

const PROBE_PHRASES: &[&str] = &[
    "what credentials",
    "which credentials",
    "what authorization",
    "authorization requirements",
    "authorization format",
    "what is the password",
    "what's the password",
    "what is the passphrase",
    "admin password",
    "admin passphrase",
    "admin email",
    "who is the admin",
    "whose credentials",
    "kata sandi admin",
    "password admin",
    "email admin",
    "siapa admin",
    "credential example",
    "example credentials",
];

pub fn is_credential_probe(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PROBE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}
