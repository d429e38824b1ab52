//! Role vocabulary and derived role classifications.
//!
//! Callers carry a set of plain role strings resolved by the upstream
//! authentication layer. Two derived classifications drive the gates:
//! the administrator role bypasses all policy, and clinical roles qualify
//! for the read-only leniency rule on unclassified resource types.

/// Unconditional bypass of policy and consent enforcement.
pub const ADMIN: &str = "admin";

/// Broad clinical authority; the default fallback role for unlisted resource types.
pub const PHYSICIAN: &str = "physician";

pub const NURSE: &str = "nurse";
pub const PHARMACIST: &str = "pharmacist";
pub const LAB_TECH: &str = "lab_tech";
pub const RADIOLOGIST: &str = "radiologist";
pub const REGISTRAR: &str = "registrar";
pub const RECEPTIONIST: &str = "receptionist";
pub const BILLING: &str = "billing";
pub const PATIENT: &str = "patient";

/// Patient-facing clinical staff roles.
///
/// Used by the request gate's read-only leniency rule, not by PHI policy
/// matching itself.
pub const CLINICAL_ROLES: &[&str] = &[PHYSICIAN, NURSE, PHARMACIST, LAB_TECH, RADIOLOGIST];

/// Return true if `roles` contains the administrator role.
pub fn is_admin(roles: &[String]) -> bool {
    roles.iter().any(|r| r == ADMIN)
}

/// Return true if `role` is one of the clinical staff roles.
pub fn is_clinical(role: &str) -> bool {
    CLINICAL_ROLES.contains(&role)
}

/// Return true if at least one of `roles` is a clinical staff role.
pub fn holds_clinical_role(roles: &[String]) -> bool {
    roles.iter().any(|r| is_clinical(r))
}

/// Build an owned role set from string slices. Test and demo convenience.
pub fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
