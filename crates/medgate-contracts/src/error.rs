//! Error taxonomy for the MEDGATE gate chain.
//!
//! Both gates resolve failures locally and terminate the chain immediately.
//! Authorization denials (`PolicyDenied`, `ConsentDenied`) are distinct from
//! the server-side `ConsentStoreUnavailable`: the former mean the system
//! evaluated the request and refused it, the latter means it could not
//! evaluate at all.

use serde::Serialize;
use thiserror::Error;

/// The unified error type for the gate chain.
#[derive(Debug, Error)]
pub enum GateError {
    /// The request gate determined the caller's roles do not permit access
    /// to the resource type. The handler chain is never invoked.
    #[error("access denied by policy: {reason}")]
    PolicyDenied { reason: String },

    /// The consent gate found no valid permitting directive, an explicit
    /// deny directive matched, or the patient in scope could not be
    /// resolved. Fail closed in every case.
    #[error("access denied by consent: {reason}")]
    ConsentDenied { reason: String },

    /// The external consent fetch itself failed. A server-side fault, not
    /// an authorization denial; never retried inside this layer.
    #[error("consent store unavailable: {reason}")]
    ConsentStoreUnavailable { reason: String },

    /// A policy file could not be loaded or violated a table invariant.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the MEDGATE crates.
pub type GateResult<T> = Result<T, GateError>;

/// The structured failure body emitted to API clients on rejection.
///
/// Clients distinguish role-based denial from consent denial by `source`,
/// and authorization failures from evaluation failures by `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialPayload {
    /// "forbidden" for authorization denials, "unavailable" for store faults,
    /// "invalid-configuration" for config errors.
    pub error: &'static str,
    /// Which stage produced the failure: "policy", "consent", or
    /// "consent-store".
    pub source: &'static str,
    pub message: String,
}

impl GateError {
    /// Render the structured payload returned to the API client.
    pub fn to_payload(&self) -> DenialPayload {
        match self {
            GateError::PolicyDenied { reason } => DenialPayload {
                error: "forbidden",
                source: "policy",
                message: reason.clone(),
            },
            GateError::ConsentDenied { reason } => DenialPayload {
                error: "forbidden",
                source: "consent",
                message: reason.clone(),
            },
            GateError::ConsentStoreUnavailable { reason } => DenialPayload {
                error: "unavailable",
                source: "consent-store",
                message: reason.clone(),
            },
            GateError::ConfigError { reason } => DenialPayload {
                error: "invalid-configuration",
                source: "policy",
                message: reason.clone(),
            },
        }
    }

    /// True for the two authorization-denial variants.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            GateError::PolicyDenied { .. } | GateError::ConsentDenied { .. }
        )
    }
}
