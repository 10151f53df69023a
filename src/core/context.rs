/// A best-effort fetch result: whatever content could be gathered, plus a
/// human-readable entry for each item that failed along the way. A non-empty
/// error list does not invalidate the content.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub content: String,
    pub errors: Vec<String>,
}

impl FetchOutcome {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Everything the review generator needs, assembled once by the orchestrator.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub diff: String,
    pub external_context: String,
    pub repo_context: String,
    pub additional_comments: String,
    pub model: String,
}
