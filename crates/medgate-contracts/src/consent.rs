//! Patient consent directives and the consent action vocabulary.
//!
//! Directives are complete, immutable snapshots fetched from an external
//! consent store. The consent gate only filters and compares them; it never
//! mutates or writes directives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status value a directive must carry to participate in evaluation.
pub const STATUS_ACTIVE: &str = "active";

/// Whether a directive's provision permits or denies the matched access.
///
/// A matching `Deny` always wins over any number of matching `Permit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionType {
    Permit,
    Deny,
}

/// The kind of access a request performs, derived from its HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentAction {
    /// Read-style access (GET, HEAD, and POST, which is used for search).
    Access,
    /// Mutating access (PUT, PATCH, DELETE).
    Correct,
}

impl ConsentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentAction::Access => "access",
            ConsentAction::Correct => "correct",
        }
    }
}

/// One recorded patient instruction about access to their data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentDirective {
    /// Lifecycle state; only "active" directives are evaluated.
    pub status: String,

    pub provision_type: ProvisionType,

    /// Action the provision governs: "access", "correct", or empty to
    /// match any action.
    #[serde(default)]
    pub provision_action: String,

    /// Start of the validity window; absent means unbounded on that side.
    #[serde(default)]
    pub provision_start: Option<DateTime<Utc>>,

    /// End of the validity window; absent means unbounded on that side.
    #[serde(default)]
    pub provision_end: Option<DateTime<Utc>>,
}

impl ConsentDirective {
    /// Return true if this directive's provision covers `action`.
    ///
    /// An empty `provision_action` matches any action.
    pub fn covers_action(&self, action: ConsentAction) -> bool {
        self.provision_action.is_empty() || self.provision_action == action.as_str()
    }

    /// Return true if `now` falls inside the provision's validity window.
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.provision_start {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.provision_end {
            if now > end {
                return false;
            }
        }
        true
    }
}
