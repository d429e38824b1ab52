//! Policy entries and the decision type the engine emits.
//!
//! A `Policy` is one row of the resource-type table: which roles may act on
//! the resource and whether the resource is PHI requiring patient consent.
//! A `Decision` is the transient output of one evaluation; it carries the
//! reason string written to the audit log.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Access rules for a single resource type.
///
/// Immutable after construction. The table holds at most one policy per
/// resource type and is loaded once at startup, then read concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Resource type identifier, e.g. "Condition" or "Patient".
    pub resource_type: String,

    /// Roles permitted unconditional access to this resource type.
    pub allowed_roles: HashSet<String>,

    /// True iff the resource type is classified as PHI. PHI access
    /// additionally requires an active patient consent directive.
    pub requires_consent: bool,
}

impl Policy {
    /// Construct a policy from string slices. The table seed and tests use this.
    pub fn new(resource_type: &str, allowed_roles: &[&str], requires_consent: bool) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            allowed_roles: allowed_roles.iter().map(|r| r.to_string()).collect(),
            requires_consent,
        }
    }

    /// Return true if any of `roles` appears in this policy's allowed set.
    pub fn permits_any(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.allowed_roles.contains(r))
    }
}

/// The outcome of one policy evaluation.
///
/// `require_consent` is true only when the decision is an allow, the caller
/// is not an administrator, and the matched policy covers a PHI resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    /// Short diagnostic, e.g. "admin role" or "insufficient role for Condition".
    /// Written to the audit log; never used for client-facing differentiation.
    pub reason: String,
    pub require_consent: bool,
}

impl Decision {
    pub fn allow(reason: &str, require_consent: bool) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
            require_consent,
        }
    }

    pub fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason,
            require_consent: false,
        }
    }
}
