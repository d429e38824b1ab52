//! The role-based policy engine.
//!
//! `PolicyEngine::evaluate` is pure and side-effect-free: it never performs
//! I/O and never blocks, so it is safe for unlimited concurrent use.
//!
//! Evaluation algorithm:
//!
//! 1. Administrator role → allow unconditionally; consent is never required.
//! 2. Explicit policy for the resource type: allow on any role intersection
//!    (consent per the policy's PHI flag), deny on none.
//! 3. No policy: allow only callers holding a designated fallback role
//!    (the physician role in the reference deployment), deny everyone else.
//!
//! Both "no intersection" and "no policy" fail closed.

use std::collections::HashSet;

use tracing::{debug, warn};

use medgate_contracts::{
    policy::Decision,
    role::{self, PHYSICIAN},
};

use crate::table::PolicyTable;

/// Pure decision function over a `PolicyTable`.
///
/// Holds no per-request state; share one instance across all requests.
#[derive(Debug)]
pub struct PolicyEngine {
    table: PolicyTable,
    /// Roles granted the default-allow fallback on resource types with no
    /// explicit policy. Whether roles beyond the physician share this
    /// privilege is a policy decision, so the set is configurable.
    fallback_roles: HashSet<String>,
}

impl PolicyEngine {
    /// Engine over `table` with the reference fallback set: `{physician}`.
    pub fn new(table: PolicyTable) -> Self {
        Self {
            table,
            fallback_roles: [PHYSICIAN.to_string()].into_iter().collect(),
        }
    }

    /// Replace the fallback role set.
    pub fn with_fallback_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// The table this engine evaluates against.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Decide whether callers holding `roles` may act on `resource_type`.
    ///
    /// `require_consent` is set on the returned decision only for a
    /// non-admin allow against a policy whose resource is PHI.
    pub fn evaluate(&self, roles: &[String], resource_type: &str) -> Decision {
        if role::is_admin(roles) {
            debug!(resource_type, "admin role, bypassing policy");
            return Decision::allow("admin role", false);
        }

        if let Some(policy) = self.table.get(resource_type) {
            if policy.permits_any(roles) {
                debug!(
                    resource_type,
                    requires_consent = policy.requires_consent,
                    "policy match"
                );
                return Decision::allow("policy match", policy.requires_consent);
            }
            warn!(resource_type, ?roles, "no allowed role held, denying");
            return Decision::deny(format!("insufficient role for {}", resource_type));
        }

        // No explicit policy: narrow default-allow for the fallback roles only.
        if roles.iter().any(|r| self.fallback_roles.contains(r)) {
            debug!(resource_type, "unlisted resource type, fallback role allowed");
            return Decision::allow("default policy for unlisted resource", false);
        }

        warn!(resource_type, ?roles, "unlisted resource type, denying");
        Decision::deny(format!("no policy for {}", resource_type))
    }
}
