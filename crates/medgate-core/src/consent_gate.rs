//! The consent middleware: second stage of the gate chain.
//!
//! Runs immediately downstream of the request gate and acts only when that
//! gate set `consent_required`. Per request:
//!
//! 1. No configured source, or flag unset → forward unchanged.
//! 2. Administrator → forward (redundant with the request gate's bypass;
//!    defense in depth).
//! 3. Resolve the patient from the query; unresolvable → fail closed.
//! 4. Fetch the patient's active directives; a fetch error is a server
//!    fault, not a denial, and is never retried.
//! 5. Match directives on status, action, and time window; a matching deny
//!    wins over any permit; no match at all also denies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use medgate_contracts::{
    consent::{ConsentAction, ConsentDirective, ProvisionType, STATUS_ACTIVE},
    error::{GateError, GateResult},
    request::{AccessContext, AccessRequest},
    role,
};

use crate::classify::{action_for_method, patient_from_request};
use crate::traits::{ConsentSource, Handler};

/// The outcome of matching a directive set against a requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentVerdict {
    /// At least one matching permit and no matching deny.
    Permitted,
    /// A matching deny directive; wins over any number of permits.
    Denied,
    /// No directive matched at all. Treated as denial — fail closed.
    NoMatch,
}

/// Evaluate `directives` against the requested `action` at time `now`.
///
/// A directive participates when its status is "active", its provision
/// action is empty or equals `action`, and its time window contains `now`.
/// Deny takes precedence over permit; absence of an explicit permit denies.
pub fn evaluate_directives(
    directives: &[ConsentDirective],
    action: ConsentAction,
    now: DateTime<Utc>,
) -> ConsentVerdict {
    let mut permitted = false;
    for directive in directives {
        if directive.status != STATUS_ACTIVE
            || !directive.covers_action(action)
            || !directive.in_window(now)
        {
            continue;
        }
        match directive.provision_type {
            ProvisionType::Deny => return ConsentVerdict::Denied,
            ProvisionType::Permit => permitted = true,
        }
    }
    if permitted {
        ConsentVerdict::Permitted
    } else {
        ConsentVerdict::NoMatch
    }
}

/// Patient-consent enforcement middleware.
///
/// Configured with an optional `ConsentSource`; without one the gate is a
/// pass-through, which keeps deployments that have no consent store yet
/// explicit rather than accidental.
pub struct ConsentGate {
    source: Option<Arc<dyn ConsentSource>>,
    inner: Box<dyn Handler>,
}

impl ConsentGate {
    pub fn new(source: Option<Arc<dyn ConsentSource>>, inner: Box<dyn Handler>) -> Self {
        Self { source, inner }
    }
}

impl Handler for ConsentGate {
    fn handle(&self, request: &AccessRequest, access: &AccessContext) -> GateResult<()> {
        let Some(source) = &self.source else {
            return self.inner.handle(request, access);
        };
        if !access.consent_required {
            return self.inner.handle(request, access);
        }

        // Defense in depth: the request gate never flags admin requests,
        // but a misbehaving upstream stage must not defeat the bypass.
        if role::is_admin(&access.roles) {
            return self.inner.handle(request, access);
        }

        let Some(patient_id) = patient_from_request(request) else {
            warn!(path = %request.path, "consent required but patient is unresolvable");
            return Err(GateError::ConsentDenied {
                reason: "patient identifier could not be resolved".to_string(),
            });
        };

        let directives =
            source
                .list_active_consents_for_patient(&patient_id)
                .map_err(|e| match e {
                    err @ GateError::ConsentStoreUnavailable { .. } => err,
                    err => GateError::ConsentStoreUnavailable { reason: err.to_string() },
                })?;

        let action = action_for_method(request.method);
        match evaluate_directives(&directives, action, Utc::now()) {
            ConsentVerdict::Permitted => {
                debug!(patient_id = %patient_id, action = action.as_str(), "consent permitted");
                self.inner.handle(request, access)
            }
            ConsentVerdict::Denied => {
                warn!(patient_id = %patient_id, action = action.as_str(), "consent explicitly denied");
                Err(GateError::ConsentDenied {
                    reason: format!("patient directive denies {} access", action.as_str()),
                })
            }
            ConsentVerdict::NoMatch => {
                warn!(patient_id = %patient_id, action = action.as_str(), "no permitting directive");
                Err(GateError::ConsentDenied {
                    reason: format!("no active directive permits {} access", action.as_str()),
                })
            }
        }
    }
}
