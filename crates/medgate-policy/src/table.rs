//! The resource-type policy table.
//!
//! One `Policy` per resource type: the roles allowed to act on it and
//! whether it is PHI requiring patient consent. The table is configuration,
//! not code — the built-in seed below mirrors the reference deployment, and
//! `from_toml_str`/`from_file` load the same shape from a `[[policies]]`
//! TOML document so the rule set can be versioned independently of the
//! engine.
//!
//! PHI partition: exactly the general-clinical, diagnostic, medication, and
//! documents/assessments/safety categories carry `requires_consent = true`.
//! Patient-context and administrative types never do.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use medgate_contracts::{
    error::{GateError, GateResult},
    policy::Policy,
    role::{ADMIN, BILLING, LAB_TECH, NURSE, PHARMACIST, PHYSICIAN, RADIOLOGIST, RECEPTIONIST, REGISTRAR},
};

// ── Role groups of the reference deployment ──────────────────────────────────

const GENERAL_CLINICAL: &[&str] = &[ADMIN, PHYSICIAN, NURSE];
const DIAGNOSTIC: &[&str] = &[ADMIN, PHYSICIAN, NURSE, LAB_TECH, RADIOLOGIST];
// Nurses are deliberately excluded from medication PHI.
const MEDICATION: &[&str] = &[ADMIN, PHYSICIAN, PHARMACIST];
const FRONT_DESK: &[&str] = &[ADMIN, REGISTRAR, RECEPTIONIST];
const SCHEDULING: &[&str] = &[ADMIN, PHYSICIAN, NURSE, REGISTRAR, RECEPTIONIST];
const REGISTRY: &[&str] = &[ADMIN, REGISTRAR];
const FINANCE: &[&str] = &[ADMIN, BILLING];

/// A lookup table mapping resource-type name → `Policy`.
///
/// Immutable after construction; loaded once at startup and read
/// concurrently by every in-flight request.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<String, Policy>,
}

/// One `[[policies]]` entry in a TOML policy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub resource_type: String,
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub requires_consent: bool,
}

/// The top-level structure deserialized from a TOML policy file.
///
/// Example:
/// ```toml
/// [[policies]]
/// resource_type = "Condition"
/// allowed_roles = ["admin", "physician", "nurse"]
/// requires_consent = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyFile {
    pub policies: Vec<PolicyEntry>,
}

impl PolicyTable {
    /// Build a table from explicit entries.
    ///
    /// Returns `GateError::ConfigError` if the same resource type appears
    /// twice — at most one policy per resource type is a table invariant.
    pub fn from_entries(entries: Vec<PolicyEntry>) -> GateResult<Self> {
        let mut policies = HashMap::with_capacity(entries.len());
        for entry in entries {
            let policy = Policy {
                resource_type: entry.resource_type.clone(),
                allowed_roles: entry.allowed_roles.into_iter().collect(),
                requires_consent: entry.requires_consent,
            };
            if policies.insert(entry.resource_type.clone(), policy).is_some() {
                return Err(GateError::ConfigError {
                    reason: format!("duplicate policy for resource type '{}'", entry.resource_type),
                });
            }
        }
        Ok(Self { policies })
    }

    /// Parse `s` as a TOML policy document and build a table.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        let file: PolicyFile = toml::from_str(s).map_err(|e| GateError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_entries(file.policies)
    }

    /// Read the file at `path` and parse it as a TOML policy document.
    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Look up the policy for `resource_type`, if one exists.
    pub fn get(&self, resource_type: &str) -> Option<&Policy> {
        self.policies.get(resource_type)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Iterate over all policies, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    /// The reference deployment's policy set.
    pub fn builtin() -> Self {
        let mut policies = HashMap::new();
        let mut add = |resource_type: &str, roles: &[&str], requires_consent: bool| {
            policies.insert(
                resource_type.to_string(),
                Policy::new(resource_type, roles, requires_consent),
            );
        };

        // ── General clinical PHI ─────────────────────────────────────────────
        for rt in [
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
        ] {
            add(rt, GENERAL_CLINICAL, true);
        }

        // ── Diagnostic PHI ───────────────────────────────────────────────────
        for rt in [
            "DiagnosticReport",
            "ServiceRequest",
            "Specimen",
            "ImagingStudy",
            "Media",
            "MolecularSequence",
        ] {
            add(rt, DIAGNOSTIC, true);
        }

        // ── Medication PHI ───────────────────────────────────────────────────
        for rt in [
            "MedicationRequest",
            "MedicationAdministration",
            "MedicationDispense",
            "MedicationStatement",
        ] {
            add(rt, MEDICATION, true);
        }

        // ── Documents, assessments, and safety PHI ───────────────────────────
        for rt in [
            "DocumentReference",
            "Composition",
            "QuestionnaireResponse",
            "RiskAssessment",
            "Flag",
            "AdverseEvent",
            "DetectedIssue",
            "Communication",
        ] {
            add(rt, GENERAL_CLINICAL, true);
        }

        // ── Patient context, non-PHI ─────────────────────────────────────────
        add("Patient", SCHEDULING, false);
        add("Encounter", SCHEDULING, false);
        add("EpisodeOfCare", &[ADMIN, PHYSICIAN, NURSE, REGISTRAR], false);
        add("CarePlan", GENERAL_CLINICAL, false);
        add("CareTeam", GENERAL_CLINICAL, false);
        add("Consent", &[ADMIN, PHYSICIAN, NURSE, REGISTRAR], false);
        add("RelatedPerson", FRONT_DESK, false);
        add("Person", REGISTRY, false);
        add("Appointment", SCHEDULING, false);
        add("AppointmentResponse", SCHEDULING, false);
        add("Schedule", FRONT_DESK, false);
        add("Slot", FRONT_DESK, false);
        add("Task", GENERAL_CLINICAL, false);
        add("Provenance", &[ADMIN], false);

        // ── Administrative, non-PHI ──────────────────────────────────────────
        add("Practitioner", REGISTRY, false);
        add("PractitionerRole", REGISTRY, false);
        add("Organization", &[ADMIN, REGISTRAR, BILLING], false);
        add("OrganizationAffiliation", REGISTRY, false);
        add("Location", FRONT_DESK, false);
        add("HealthcareService", REGISTRY, false);
        add("Endpoint", &[ADMIN], false);
        add("Device", GENERAL_CLINICAL, false);
        add("DeviceDefinition", &[ADMIN], false);
        // Drug catalogs: pharmacists, not nurses.
        add("Medication", MEDICATION, false);
        add("MedicationKnowledge", &[ADMIN, PHARMACIST], false);
        add("Substance", &[ADMIN, PHARMACIST, LAB_TECH], false);
        add("CodeSystem", REGISTRY, false);
        add("ValueSet", REGISTRY, false);
        add("ConceptMap", REGISTRY, false);
        add("NamingSystem", &[ADMIN], false);
        add("StructureDefinition", &[ADMIN], false);
        add("Questionnaire", GENERAL_CLINICAL, false);
        add("Account", FINANCE, false);
        add("Coverage", &[ADMIN, BILLING, REGISTRAR], false);
        add("CoverageEligibilityRequest", FINANCE, false);
        add("CoverageEligibilityResponse", FINANCE, false);
        add("Claim", FINANCE, false);
        add("ClaimResponse", FINANCE, false);
        add("ExplanationOfBenefit", FINANCE, false);
        add("Invoice", FINANCE, false);
        add("ChargeItem", FINANCE, false);
        add("ChargeItemDefinition", FINANCE, false);
        add("PaymentNotice", FINANCE, false);
        add("PaymentReconciliation", FINANCE, false);
        add("InsurancePlan", FINANCE, false);

        Self { policies }
    }
}
