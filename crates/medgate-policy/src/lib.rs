//! # medgate-policy
//!
//! The declarative policy table and role evaluation engine for MEDGATE.
//!
//! ## Overview
//!
//! [`PolicyTable`] maps each resource type to the roles allowed to act on it
//! and a PHI flag. [`PolicyEngine::evaluate`] turns a caller's role set and
//! a resource type into a [`Decision`](medgate_contracts::policy::Decision):
//! allow/deny, an audit reason, and whether patient consent must additionally
//! be verified. Unknown resource types fail closed except for a configurable
//! fallback role set.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use medgate_policy::{PolicyEngine, PolicyTable};
//!
//! let engine = PolicyEngine::new(PolicyTable::builtin());
//! let decision = engine.evaluate(&roles, "Condition");
//! ```

pub mod engine;
pub mod table;

pub use engine::PolicyEngine;
pub use table::{PolicyEntry, PolicyFile, PolicyTable};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use medgate_contracts::error::GateError;
    use medgate_contracts::role::{self, roles};

    use crate::{PolicyEngine, PolicyTable};

    fn engine() -> PolicyEngine {
        PolicyEngine::new(PolicyTable::builtin())
    }

    /// The fixed PHI set of the reference deployment, stated independently of
    /// the table construction so the partition is checked, not echoed.
    const PHI_RESOURCE_TYPES: &[&str] = &[
        // general clinical
        "Condition",
        "Observation",
        "AllergyIntolerance",
        "Procedure",
        "Immunization",
        "FamilyMemberHistory",
        "ClinicalImpression",
        "Goal",
        "NutritionOrder",
        "BodyStructure",
        // diagnostic
        "DiagnosticReport",
        "ServiceRequest",
        "Specimen",
        "ImagingStudy",
        "Media",
        "MolecularSequence",
        // medication
        "MedicationRequest",
        "MedicationAdministration",
        "MedicationDispense",
        "MedicationStatement",
        // documents, assessments, safety
        "DocumentReference",
        "Composition",
        "QuestionnaireResponse",
        "RiskAssessment",
        "Flag",
        "AdverseEvent",
        "DetectedIssue",
        "Communication",
    ];

    // ── 1. admin bypass ───────────────────────────────────────────────────────

    /// The administrator is allowed on every resource type in the table and
    /// on unlisted types, and never triggers consent checking.
    #[test]
    fn admin_bypass_is_absolute() {
        let engine = engine();
        let admin = roles(&["admin"]);

        for policy in engine.table().iter() {
            let d = engine.evaluate(&admin, &policy.resource_type);
            assert!(d.allowed, "admin denied on {}", policy.resource_type);
            assert!(!d.require_consent, "admin consent-flagged on {}", policy.resource_type);
            assert_eq!(d.reason, "admin role");
        }

        // Unlisted resource type.
        let d = engine.evaluate(&admin, "Widget");
        assert!(d.allowed);
        assert!(!d.require_consent);
    }

    // ── 2. PHI partition ──────────────────────────────────────────────────────

    /// `requires_consent` is true iff the resource type is in the fixed PHI
    /// set, checked exhaustively over the built-in table.
    #[test]
    fn phi_partition_is_exact() {
        let table = PolicyTable::builtin();
        let phi: HashSet<&str> = PHI_RESOURCE_TYPES.iter().copied().collect();

        for policy in table.iter() {
            assert_eq!(
                policy.requires_consent,
                phi.contains(policy.resource_type.as_str()),
                "wrong PHI classification for {}",
                policy.resource_type
            );
        }

        // Every PHI type has a policy — none is left to the fallback rule.
        for rt in PHI_RESOURCE_TYPES {
            assert!(table.get(rt).is_some(), "missing policy for PHI type {}", rt);
        }
    }

    /// The built-in table is on the order of 70 entries and every allowed-role
    /// set includes the administrator.
    #[test]
    fn builtin_table_shape() {
        let table = PolicyTable::builtin();
        assert!(table.len() >= 70, "expected ~70 policies, got {}", table.len());
        for policy in table.iter() {
            assert!(
                policy.allowed_roles.contains("admin"),
                "{} does not list admin",
                policy.resource_type
            );
        }
    }

    // ── 3. role intersection ──────────────────────────────────────────────────

    /// Any non-empty intersection allows; an empty intersection denies.
    #[test]
    fn role_matching_is_set_intersection() {
        let engine = engine();

        // Condition allows {admin, physician, nurse}; caller holds {nurse, billing}.
        let d = engine.evaluate(&roles(&["nurse", "billing"]), "Condition");
        assert!(d.allowed);
        assert_eq!(d.reason, "policy match");

        let d = engine.evaluate(&roles(&["billing", "registrar"]), "Condition");
        assert!(!d.allowed);
        assert_eq!(d.reason, "insufficient role for Condition");
        assert!(!d.require_consent);
    }

    /// Nurses hold general-clinical PHI access but are excluded from
    /// medication PHI; pharmacists are the inverse.
    #[test]
    fn medication_excludes_nurse() {
        let engine = engine();

        assert!(!engine.evaluate(&roles(&["nurse"]), "MedicationRequest").allowed);
        assert!(engine.evaluate(&roles(&["pharmacist"]), "MedicationRequest").allowed);
        assert!(!engine.evaluate(&roles(&["pharmacist"]), "Condition").allowed);
    }

    // ── 4. consent flag ───────────────────────────────────────────────────────

    /// A non-admin allow on a PHI policy sets `require_consent`; the same
    /// caller on a non-PHI policy does not.
    #[test]
    fn consent_flag_follows_policy_classification() {
        let engine = engine();
        let nurse = roles(&["nurse"]);

        let d = engine.evaluate(&nurse, "Condition");
        assert!(d.allowed && d.require_consent);

        let d = engine.evaluate(&nurse, "Patient");
        assert!(d.allowed && !d.require_consent);
    }

    // ── 5. fallback asymmetry ─────────────────────────────────────────────────

    /// Unlisted resource types: the physician fallback allows, everyone else
    /// is denied — including other clinical roles.
    #[test]
    fn fallback_is_physician_only_by_default() {
        let engine = engine();

        let d = engine.evaluate(&roles(&["physician"]), "Widget");
        assert!(d.allowed);
        assert_eq!(d.reason, "default policy for unlisted resource");
        assert!(!d.require_consent);

        for held in ["nurse", "pharmacist", "lab_tech", "radiologist", "billing", "patient"] {
            let d = engine.evaluate(&roles(&[held]), "Widget");
            assert!(!d.allowed, "{} unexpectedly allowed on unlisted type", held);
            assert_eq!(d.reason, "no policy for Widget");
        }

        let d = engine.evaluate(&[], "Widget");
        assert!(!d.allowed);
    }

    /// The fallback role set is configurable.
    #[test]
    fn fallback_roles_can_be_widened() {
        let engine = PolicyEngine::new(PolicyTable::builtin())
            .with_fallback_roles([role::PHYSICIAN, role::NURSE]);

        assert!(engine.evaluate(&roles(&["nurse"]), "Widget").allowed);
        assert!(!engine.evaluate(&roles(&["billing"]), "Widget").allowed);
    }

    // ── 6. TOML loading ───────────────────────────────────────────────────────

    #[test]
    fn table_loads_from_toml() {
        let toml = r#"
            [[policies]]
            resource_type = "Condition"
            allowed_roles = ["admin", "physician", "nurse"]
            requires_consent = true

            [[policies]]
            resource_type = "Practitioner"
            allowed_roles = ["admin", "registrar"]
        "#;

        let table = PolicyTable::from_toml_str(toml).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("Condition").unwrap().requires_consent);
        // requires_consent defaults to false when omitted.
        assert!(!table.get("Practitioner").unwrap().requires_consent);
    }

    #[test]
    fn duplicate_resource_type_is_a_config_error() {
        let toml = r#"
            [[policies]]
            resource_type = "Condition"
            allowed_roles = ["admin"]

            [[policies]]
            resource_type = "Condition"
            allowed_roles = ["admin", "physician"]
        "#;

        match PolicyTable::from_toml_str(toml) {
            Err(GateError::ConfigError { reason }) => {
                assert!(reason.contains("duplicate policy"), "unexpected reason: {reason}");
                assert!(reason.contains("Condition"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        match PolicyTable::from_toml_str("not toml ][[[") {
            Err(GateError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse policy TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
