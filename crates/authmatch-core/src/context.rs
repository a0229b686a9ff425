//! Request-scoped tracing context.

use uuid::Uuid;

/// Identity of one comparison request, passed explicitly down the call
/// stack and recorded on every span the request opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
}

impl RequestContext {
    /// A context with a fresh random request id.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }

    pub fn with_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    /// Root span for work done on behalf of this request.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("request", request_id = %self.request_id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
