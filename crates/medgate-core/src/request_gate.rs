//! The role middleware: first stage of the gate chain.
//!
//! Per request:
//!
//! 1. Classify the path into a resource type. Paths outside the resource
//!    API are forwarded unchanged, with no policy check at all.
//! 2. Evaluate the caller's roles against the policy table.
//! 3. On denial, apply one leniency override: clinical roles may read
//!    (GET/HEAD only) resource types the table does not classify yet.
//! 4. Still denied → `GateError::PolicyDenied`; downstream is never called.
//! 5. Allowed → forward, setting `consent_required` on the downstream
//!    context when the decision demands it.

use std::sync::Arc;

use tracing::{debug, warn};

use medgate_contracts::{
    error::{GateError, GateResult},
    request::{AccessContext, AccessRequest},
    role,
};
use medgate_policy::PolicyEngine;

use crate::classify::resource_type_from_path;
use crate::traits::Handler;

/// Default resource-API prefix: paths look like `/fhir/<Type>[/<id>]`.
pub const DEFAULT_RESOURCE_PREFIX: &str = "fhir";

/// Role-based policy enforcement middleware.
///
/// Stateless aside from the engine and prefix it closes over; one instance
/// serves any number of concurrent requests.
pub struct RequestGate {
    engine: Arc<PolicyEngine>,
    prefix: String,
    inner: Box<dyn Handler>,
}

impl RequestGate {
    pub fn new(engine: Arc<PolicyEngine>, inner: Box<dyn Handler>) -> Self {
        Self {
            engine,
            prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            inner,
        }
    }

    /// Override the resource-API path prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }
}

impl Handler for RequestGate {
    fn handle(&self, request: &AccessRequest, access: &AccessContext) -> GateResult<()> {
        let Some(resource_type) = resource_type_from_path(&self.prefix, &request.path) else {
            // Outside the gate's jurisdiction.
            debug!(path = %request.path, "path has no resource type, forwarding ungated");
            return self.inner.handle(request, access);
        };

        let mut decision = self.engine.evaluate(&access.roles, resource_type);

        // Read-only leniency: clinical staff may read resource types the
        // table does not yet list. Never for other methods or other roles.
        if !decision.allowed
            && request.method.is_read_only()
            && role::holds_clinical_role(&access.roles)
        {
            debug!(
                resource_type,
                method = ?request.method,
                "denial overridden by clinical read-only leniency"
            );
            decision.allowed = true;
            decision.require_consent = false;
        }

        if !decision.allowed {
            warn!(
                resource_type,
                method = ?request.method,
                reason = %decision.reason,
                "request rejected by policy"
            );
            return Err(GateError::PolicyDenied {
                reason: decision.reason,
            });
        }

        let downstream = AccessContext {
            roles: access.roles.clone(),
            consent_required: decision.require_consent,
        };
        self.inner.handle(request, &downstream)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use medgate_contracts::error::GateError;
    use medgate_contracts::request::{AccessContext, AccessRequest, Method};
    use medgate_contracts::role::roles;
    use medgate_policy::{PolicyEngine, PolicyTable};

    use crate::traits::Handler;

    use super::RequestGate;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Records every forwarded call and the context it arrived with.
    struct RecordingHandler {
        calls: Arc<Mutex<Vec<AccessContext>>>,
    }

    impl Handler for RecordingHandler {
        fn handle(
            &self,
            _request: &AccessRequest,
            access: &AccessContext,
        ) -> medgate_contracts::error::GateResult<()> {
            self.calls.lock().unwrap().push(access.clone());
            Ok(())
        }
    }

    fn gate() -> (RequestGate, Arc<Mutex<Vec<AccessContext>>>) {
        let calls = Arc::new(Mutex::new(vec![]));
        let gate = RequestGate::new(
            Arc::new(PolicyEngine::new(PolicyTable::builtin())),
            Box::new(RecordingHandler { calls: calls.clone() }),
        );
        (gate, calls)
    }

    fn ctx(role_names: &[&str]) -> AccessContext {
        AccessContext::for_roles(roles(role_names))
    }

    // ── jurisdiction ─────────────────────────────────────────────────────────

    /// Paths without a resource type bypass the gate entirely, even for
    /// callers with no roles at all.
    #[test]
    fn foreign_path_forwards_without_policy_check() {
        let (gate, calls) = gate();
        let req = AccessRequest::new(Method::Delete, "/healthz");

        gate.handle(&req, &ctx(&[])).unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    // ── policy enforcement ───────────────────────────────────────────────────

    #[test]
    fn denied_role_never_reaches_downstream() {
        let (gate, calls) = gate();
        let req = AccessRequest::new(Method::Post, "/fhir/MedicationRequest");

        let err = gate.handle(&req, &ctx(&["nurse"])).unwrap_err();
        match err {
            GateError::PolicyDenied { reason } => {
                assert_eq!(reason, "insufficient role for MedicationRequest");
            }
            other => panic!("expected PolicyDenied, got {:?}", other),
        }
        assert!(calls.lock().unwrap().is_empty(), "downstream must not run on denial");
    }

    /// PHI allow sets the consent flag on the forwarded context; non-PHI
    /// allow does not.
    #[test]
    fn consent_flag_is_attached_only_for_phi() {
        let (gate, calls) = gate();

        gate.handle(&AccessRequest::new(Method::Get, "/fhir/Condition/1"), &ctx(&["nurse"]))
            .unwrap();
        gate.handle(&AccessRequest::new(Method::Get, "/fhir/Patient/1"), &ctx(&["nurse"]))
            .unwrap();

        let calls = calls.lock().unwrap();
        assert!(calls[0].consent_required);
        assert!(!calls[1].consent_required);
    }

    /// The admin bypass never sets the consent flag, PHI or not.
    #[test]
    fn admin_forwards_without_consent_flag() {
        let (gate, calls) = gate();

        gate.handle(&AccessRequest::new(Method::Put, "/fhir/Condition/1"), &ctx(&["admin"]))
            .unwrap();
        assert!(!calls.lock().unwrap()[0].consent_required);
    }

    // ── read-only leniency ───────────────────────────────────────────────────

    /// A clinical caller denied by the engine on an unlisted type is allowed
    /// for GET and HEAD, and only for those.
    #[test]
    fn leniency_is_method_gated() {
        let (gate, calls) = gate();
        let nurse = ctx(&["nurse"]);

        gate.handle(&AccessRequest::new(Method::Get, "/fhir/Widget"), &nurse).unwrap();
        gate.handle(&AccessRequest::new(Method::Head, "/fhir/Widget"), &nurse).unwrap();
        {
            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 2);
            // Leniency never asks for consent.
            assert!(calls.iter().all(|c| !c.consent_required));
        }

        for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
            let err = gate.handle(&AccessRequest::new(method, "/fhir/Widget"), &nurse).unwrap_err();
            assert!(matches!(err, GateError::PolicyDenied { .. }));
        }
    }

    /// Non-clinical roles get no leniency for any method.
    #[test]
    fn leniency_is_role_gated() {
        let (gate, calls) = gate();

        for method in [Method::Get, Method::Head, Method::Post] {
            let err = gate
                .handle(&AccessRequest::new(method, "/fhir/Widget"), &ctx(&["billing"]))
                .unwrap_err();
            assert!(matches!(err, GateError::PolicyDenied { .. }));
        }
        assert!(calls.lock().unwrap().is_empty());
    }

    /// Leniency also covers listed types the caller's role cannot access,
    /// but only for reads: a nurse may GET a MedicationRequest, not POST it.
    #[test]
    fn leniency_applies_to_explicit_denials_on_reads() {
        let (gate, calls) = gate();

        gate.handle(&AccessRequest::new(Method::Get, "/fhir/MedicationRequest"), &ctx(&["nurse"]))
            .unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    // ── prefix configuration ─────────────────────────────────────────────────

    #[test]
    fn custom_prefix_moves_the_jurisdiction() {
        let calls = Arc::new(Mutex::new(vec![]));
        let gate = RequestGate::new(
            Arc::new(PolicyEngine::new(PolicyTable::builtin())),
            Box::new(RecordingHandler { calls: calls.clone() }),
        )
        .with_prefix("r4");

        // /fhir/... is now foreign; /r4/... is gated.
        gate.handle(&AccessRequest::new(Method::Post, "/fhir/Condition"), &ctx(&["billing"]))
            .unwrap();
        let err = gate
            .handle(&AccessRequest::new(Method::Post, "/r4/Condition"), &ctx(&["billing"]))
            .unwrap_err();
        assert!(matches!(err, GateError::PolicyDenied { .. }));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
