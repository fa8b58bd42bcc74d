use crate::content::{ContentCache, ContentRequest, RunbookId, RunbookSource, Variant};
use crate::params::{ExtractError, ParameterDescriptor, ParameterExtractor};

/// A runbook open for editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runbook {
    id: RunbookId,
    name: String,
    checked_out: bool,
    /// Content as last loaded from the store, for change detection
    baseline: String,
}

impl Runbook {
    /// Create a checked-out runbook with nothing loaded yet
    pub fn new(id: RunbookId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            checked_out: true,
            baseline: String::new(),
        }
    }

    pub fn id(&self) -> RunbookId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_checked_out(&self) -> bool {
        self.checked_out
    }

    pub fn set_checked_out(&mut self, checked_out: bool) {
        self.checked_out = checked_out;
    }

    /// Checked-out runbooks edit the draft; others show what is published
    pub fn variant(&self) -> Variant {
        if self.checked_out {
            Variant::Draft
        } else {
            Variant::Published
        }
    }

    /// Tab title: the name, `*` when `current_text` has unsaved changes and
    /// ` (draft)` while checked out
    pub fn title(&self, current_text: &str) -> String {
        let mut title = if self.name.is_empty() {
            "untitled".to_string()
        } else {
            self.name.clone()
        };
        if self.has_unsaved_changes(current_text) {
            title.push('*');
        }
        if self.checked_out {
            title.push_str(" (draft)");
        }
        title
    }

    pub fn has_unsaved_changes(&self, current_text: &str) -> bool {
        current_text != self.baseline
    }

    /// Record `content` as what the store holds
    pub fn mark_loaded(&mut self, content: &str) {
        self.baseline = content.to_string();
    }

    pub fn content_request(&self, force: bool) -> ContentRequest {
        ContentRequest {
            variant: self.variant(),
            force,
        }
    }

    /// Fetch the content for this runbook's variant and make it the baseline
    pub fn load<S: RunbookSource>(&mut self, cache: &ContentCache<S>, force: bool) -> String {
        let content = cache.get_content(self.content_request(force));
        self.mark_loaded(&content);
        content
    }

    /// Parameters declared by the current content
    pub fn parameters<S: RunbookSource>(
        &self,
        cache: &ContentCache<S>,
    ) -> Result<Vec<ParameterDescriptor>, ExtractError> {
        let content = cache.get_content(self.content_request(false));
        ParameterExtractor::new().extract(&content)
    }
}
