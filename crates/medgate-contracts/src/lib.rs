//! # medgate-contracts
//!
//! Shared types and the error taxonomy for the MEDGATE access-control layer.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod consent;
pub mod error;
pub mod policy;
pub mod request;
pub mod role;
