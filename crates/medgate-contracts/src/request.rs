//! Router-independent request model.
//!
//! The concrete HTTP framework sits outside this layer; the gates see a
//! request as its method, path, and query parameters, plus an
//! `AccessContext` that the upstream authentication layer seeds with the
//! caller's resolved roles. The consent-required flag set by the request
//! gate is a typed field on that context, so the contract between the two
//! gates is visible at compile time rather than hidden in a key-value bag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// HTTP method, reduced to the set the gates distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Other,
}

impl Method {
    /// Parse a method name, case-insensitively. Unknown methods map to
    /// `Other`, which is never treated as read-only.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            _ => Method::Other,
        }
    }

    /// GET and HEAD only. POST is deliberately excluded here: the read-only
    /// leniency rule at the request gate never applies to POST.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

/// One inbound request as seen by the gates.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub method: Method,
    /// Request path, e.g. "/fhir/Condition/42".
    pub path: String,
    /// Decoded query parameters.
    pub query: HashMap<String, String>,
}

impl AccessRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: HashMap::new(),
        }
    }

    /// Add a query parameter. Builder-style, for tests and adapters.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Return the query parameter `key` if present and non-empty.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Per-request authorization state flowing down the handler chain.
///
/// The upstream authentication layer populates `roles` before the request
/// gate runs. The request gate is the only writer of `consent_required`;
/// the consent gate is its only reader.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    /// The caller's resolved role strings. May be empty.
    pub roles: Vec<String>,
    /// Set by the request gate when the matched policy covers a PHI
    /// resource and the caller is not an administrator.
    pub consent_required: bool,
}

impl AccessContext {
    /// Context for a caller holding `roles`, with no consent obligation yet.
    pub fn for_roles(roles: Vec<String>) -> Self {
        Self {
            roles,
            consent_required: false,
        }
    }
}
