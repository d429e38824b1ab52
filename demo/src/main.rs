//! MEDGATE — Access-Control Demo CLI
//!
//! Runs the end-to-end gate-chain scenarios against the built-in policy
//! table and an in-memory consent store, or evaluates an ad-hoc request
//! with `check`.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- check --roles nurse --method GET --path /fhir/Condition/1 --patient p-1
//!   cargo run -p demo -- check --roles nurse --method PUT --path /fhir/MedicationRequest/2

use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use medgate_contracts::{
    consent::{ConsentDirective, ProvisionType},
    error::GateResult,
    request::{AccessContext, AccessRequest, Method},
    role,
};
use medgate_core::{ConsentSource, GateChain, Handler};
use medgate_policy::{PolicyEngine, PolicyTable};

// ── CLI definition ────────────────────────────────────────────────────────────

/// MEDGATE — role and consent gates for a healthcare-records API.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "MEDGATE access-control demo",
    long_about = "Runs the two-stage authorization chain (role gate, then patient-consent\n\
                  gate) against the built-in policy table and an in-memory consent store."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three reference scenarios in sequence.
    RunAll,
    /// Physician GET on Condition with a blanket permit: allowed end to end.
    PermitFlow,
    /// Same request with zero directives on record: denied at the consent gate.
    ConsentDenial,
    /// Nurse on Patient (non-PHI): the consent gate never engages.
    NonPhi,
    /// Evaluate one request against the chain.
    Check {
        /// Caller roles, comma separated (e.g. "physician" or "nurse,billing").
        #[arg(long)]
        roles: String,
        /// HTTP method.
        #[arg(long, default_value = "GET")]
        method: String,
        /// Request path (e.g. /fhir/Condition/1).
        #[arg(long)]
        path: String,
        /// Patient identifier; when set, the in-memory store holds a blanket
        /// permit for exactly this patient.
        #[arg(long)]
        patient: Option<String>,
    },
}

// ── In-memory collaborators ───────────────────────────────────────────────────

/// Consent store holding directive snapshots keyed by patient id.
struct MemoryStore {
    by_patient: HashMap<String, Vec<ConsentDirective>>,
}

impl MemoryStore {
    fn empty() -> Self {
        Self { by_patient: HashMap::new() }
    }

    fn with_blanket_permit(patient_id: &str) -> Self {
        let mut by_patient = HashMap::new();
        by_patient.insert(
            patient_id.to_string(),
            vec![ConsentDirective {
                status: "active".to_string(),
                provision_type: ProvisionType::Permit,
                provision_action: String::new(),
                provision_start: None,
                provision_end: None,
            }],
        );
        Self { by_patient }
    }
}

impl ConsentSource for MemoryStore {
    fn list_active_consents_for_patient(
        &self,
        patient_id: &str,
    ) -> GateResult<Vec<ConsentDirective>> {
        Ok(self.by_patient.get(patient_id).cloned().unwrap_or_default())
    }
}

/// Downstream stand-in for the CRUD handler chain.
struct EchoHandler;

impl Handler for EchoHandler {
    fn handle(&self, request: &AccessRequest, access: &AccessContext) -> GateResult<()> {
        println!(
            "  handler reached: {:?} {} (consent_required={})",
            request.method, request.path, access.consent_required
        );
        Ok(())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::RunAll => {
            run_permit_flow();
            run_consent_denial();
            run_non_phi();
        }
        Command::PermitFlow => run_permit_flow(),
        Command::ConsentDenial => run_consent_denial(),
        Command::NonPhi => run_non_phi(),
        Command::Check { roles, method, path, patient } => {
            run_check(&roles, &method, &path, patient.as_deref())
        }
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn build_chain(store: MemoryStore) -> Box<dyn Handler> {
    let engine = Arc::new(PolicyEngine::new(PolicyTable::builtin()));
    GateChain::new(engine)
        .with_consent_source(Arc::new(store))
        .wrap(Box::new(EchoHandler))
}

fn report(outcome: GateResult<()>) {
    match outcome {
        Ok(()) => println!("  => allowed"),
        Err(e) => {
            let payload = e.to_payload();
            println!(
                "  => rejected: {}",
                serde_json::to_string(&payload).unwrap_or_else(|_| e.to_string())
            );
        }
    }
}

fn run_permit_flow() {
    println!("scenario: physician GET /fhir/Condition?patient=p-1, blanket permit on file");
    let chain = build_chain(MemoryStore::with_blanket_permit("p-1"));
    let req = AccessRequest::new(Method::Get, "/fhir/Condition").with_query("patient", "p-1");
    report(chain.handle(&req, &AccessContext::for_roles(role::roles(&["physician"]))));
}

fn run_consent_denial() {
    println!("scenario: physician GET /fhir/Condition?patient=p-1, no directives on file");
    let chain = build_chain(MemoryStore::empty());
    let req = AccessRequest::new(Method::Get, "/fhir/Condition").with_query("patient", "p-1");
    report(chain.handle(&req, &AccessContext::for_roles(role::roles(&["physician"]))));
}

fn run_non_phi() {
    println!("scenario: nurse GET /fhir/Patient/9, consent store empty");
    let chain = build_chain(MemoryStore::empty());
    let req = AccessRequest::new(Method::Get, "/fhir/Patient/9");
    report(chain.handle(&req, &AccessContext::for_roles(role::roles(&["nurse"]))));
}

fn run_check(roles_arg: &str, method: &str, path: &str, patient: Option<&str>) {
    let roles: Vec<String> = roles_arg
        .split(',')
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    let store = match patient {
        Some(id) => MemoryStore::with_blanket_permit(id),
        None => MemoryStore::empty(),
    };
    let chain = build_chain(store);

    let mut req = AccessRequest::new(Method::parse(method), path);
    if let Some(id) = patient {
        req = req.with_query("patient", id);
    }

    println!("check: roles={:?} {} {}", roles, method, path);
    report(chain.handle(&req, &AccessContext::for_roles(roles)));
}
