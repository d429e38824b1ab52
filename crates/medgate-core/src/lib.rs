//! # medgate-core
//!
//! The two-stage authorization middleware chain for MEDGATE.
//!
//! This crate provides:
//! - The trust-boundary traits (`Handler`, `ConsentSource`)
//! - Request classification helpers (path → resource type, method → action,
//!   query → patient identifier)
//! - The `RequestGate` (role policy) and `ConsentGate` (patient directives)
//! - `GateChain`, which assembles them in the mandated order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medgate_core::GateChain;
//! use medgate_policy::{PolicyEngine, PolicyTable};
//!
//! let engine = Arc::new(PolicyEngine::new(PolicyTable::builtin()));
//! let chain = GateChain::new(engine).with_consent_source(store).wrap(handler);
//! ```

pub mod chain;
pub mod classify;
pub mod consent_gate;
pub mod request_gate;
pub mod traits;

pub use chain::GateChain;
pub use consent_gate::{evaluate_directives, ConsentGate, ConsentVerdict};
pub use request_gate::RequestGate;
pub use traits::{ConsentSource, Handler};

// ── End-to-end chain tests ────────────────────────────────────────────────────
