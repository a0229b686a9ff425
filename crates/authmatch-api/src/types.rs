use authmatch_ai::ComparePipeline;

/// Largest multipart request accepted, all documents together.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ComparePipeline,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(pipeline: ComparePipeline) -> Self {
        Self {
            pipeline,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}
