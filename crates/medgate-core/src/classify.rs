//! Request classification helpers.
//!
//! Pure functions turning a request's shape into the vocabulary the gates
//! decide over: path → resource type, method → consent action, query
//! parameters → patient identifier.

use medgate_contracts::{
    consent::ConsentAction,
    request::{AccessRequest, Method},
};

/// Extract the resource type from `path`: the segment immediately following
/// `/<prefix>/`, as in `/fhir/Condition` or `/fhir/Condition/42`.
///
/// Any other shape returns `None` — such requests are outside the gate's
/// jurisdiction and are forwarded without a policy check.
pub fn resource_type_from_path<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix('/')?.strip_prefix(prefix)?.strip_prefix('/')?;
    let segment = rest.split('/').next().unwrap_or("");
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Map an HTTP method to the consent action it requires.
///
/// POST maps to `Access`: the surrounding API uses POST primarily for
/// search operations, not resource creation.
pub fn action_for_method(method: Method) -> ConsentAction {
    match method {
        Method::Put | Method::Patch | Method::Delete => ConsentAction::Correct,
        Method::Get | Method::Head | Method::Post | Method::Other => ConsentAction::Access,
    }
}

/// Resolve the patient identifier the request concerns.
///
/// The `patient` query parameter is a bare identifier; failing that, a
/// FHIR-style `subject=Patient/<id>` reference is accepted with the type
/// prefix stripped. Returns `None` when neither yields an identifier.
pub fn patient_from_request(request: &AccessRequest) -> Option<String> {
    if let Some(id) = request.query_param("patient") {
        return Some(id.to_string());
    }
    let subject = request.query_param("subject")?;
    let id = subject.strip_prefix("Patient/").unwrap_or(subject);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
