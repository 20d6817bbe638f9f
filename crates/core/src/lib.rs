pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod price;

pub use auth::{AdminIdentity, AuthorizationGate, CredentialAttempt, GateDecision};
pub use domain::product::ProductRecord;
pub use errors::CatalogError;
