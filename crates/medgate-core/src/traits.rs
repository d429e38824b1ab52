//! Trait seams between the gates and their external collaborators.
//!
//! The two traits define the complete trust boundary of this layer:
//!
//! - `Handler`       — the downstream resource handler chain (CRUD, mapping,
//!                     persistence); untrusted to enforce authorization itself
//! - `ConsentSource` — the external consent store; the only I/O dependency
//!
//! The gates wire them together: downstream `Handler::handle` is never
//! invoked unless the role gate — and, for PHI, the consent gate — passed.

use medgate_contracts::{
    consent::ConsentDirective,
    error::GateResult,
    request::{AccessContext, AccessRequest},
};

/// A stage in the request handling chain.
///
/// Gates implement this trait and wrap an inner `Handler`, so a chain is
/// composed by nesting boxed handlers. Implementations must be stateless
/// across requests apart from the immutable configuration they close over.
pub trait Handler: Send + Sync {
    /// Process one request with the authorization state accumulated so far.
    ///
    /// Gates return `Err` to terminate the chain; the downstream handler is
    /// not called in that case.
    fn handle(&self, request: &AccessRequest, access: &AccessContext) -> GateResult<()>;
}

/// The consent gate's sole dependency on the persistence layer.
///
/// May be backed by any storage technology. The fetch may perform network
/// or database I/O; implementations own the timeout and cancellation
/// discipline of that call, and should abort it when the request is
/// abandoned rather than letting it complete against a disconnected client.
pub trait ConsentSource: Send + Sync {
    /// List the active-status consent directives recorded for `patient_id`.
    ///
    /// An `Err` here is a server-side fault: the gate surfaces it as
    /// `GateError::ConsentStoreUnavailable` and never retries.
    fn list_active_consents_for_patient(
        &self,
        patient_id: &str,
    ) -> GateResult<Vec<ConsentDirective>>;
}
