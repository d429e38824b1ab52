//! Builder assembling the two gates around a downstream handler.
//!
//! The ordering is fixed: RequestGate → ConsentGate → handler. The consent
//! gate must sit inside the request gate because the consent-required flag
//! only exists on the context the request gate forwards.

use std::sync::Arc;

use medgate_policy::PolicyEngine;

use crate::consent_gate::ConsentGate;
use crate::request_gate::{RequestGate, DEFAULT_RESOURCE_PREFIX};
use crate::traits::{ConsentSource, Handler};

/// Configuration for one gate chain.
///
/// ```rust,ignore
/// use medgate_core::GateChain;
///
/// let chain = GateChain::new(engine)
///     .with_consent_source(store)
///     .wrap(handler);
/// chain.handle(&request, &context)?;
/// ```
pub struct GateChain {
    engine: Arc<PolicyEngine>,
    source: Option<Arc<dyn ConsentSource>>,
    prefix: String,
}

impl GateChain {
    pub fn new(engine: Arc<PolicyEngine>) -> Self {
        Self {
            engine,
            source: None,
            prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
        }
    }

    /// Attach the consent store. Without one the consent gate passes every
    /// request through.
    pub fn with_consent_source(mut self, source: Arc<dyn ConsentSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Override the resource-API path prefix (default "fhir").
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Wrap `handler` in the two gates, innermost first.
    pub fn wrap(self, handler: Box<dyn Handler>) -> Box<dyn Handler> {
        let consent = ConsentGate::new(self.source, handler);
        let request = RequestGate::new(self.engine, Box::new(consent)).with_prefix(&self.prefix);
        Box::new(request)
    }
}
