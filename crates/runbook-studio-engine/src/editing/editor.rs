//! The editing session for one runbook: buffer, bookmarks and diagnostics.

use std::ops::Range;

use crate::params::{PowerShellGrammar, ScriptGrammar};

use super::bookmarks::BookmarkStore;
use super::buffer::{EditEvent, LineIndex, ScriptBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    /// Reparse after every edit and keep parse error bookmarks in sync.
    pub code_analysis: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            code_analysis: true,
        }
    }
}

/// Owns the script text and the bookmarks anchored to it.
///
/// Every edit is applied to the buffer first; the resulting delta events are
/// then forwarded to the bookmark store in document order, line bookmark
/// markers are re-spanned and, with code analysis on, the script is reparsed.
pub struct RunbookEditor {
    buffer: ScriptBuffer,
    bookmarks: BookmarkStore,
    grammar: Box<dyn ScriptGrammar>,
    options: EditorOptions,
}

impl RunbookEditor {
    pub fn new(text: &str, options: EditorOptions) -> Self {
        Self::with_grammar(text, options, PowerShellGrammar)
    }

    pub fn with_grammar(
        text: &str,
        options: EditorOptions,
        grammar: impl ScriptGrammar + 'static,
    ) -> Self {
        let mut editor = Self {
            buffer: ScriptBuffer::new(text),
            bookmarks: BookmarkStore::new(),
            grammar: Box::new(grammar),
            options,
        };
        editor.reparse();
        editor
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &ScriptBuffer {
        &self.buffer
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// Direct access for subscribing to notifications.
    pub fn bookmarks_mut(&mut self) -> &mut BookmarkStore {
        &mut self.bookmarks
    }

    pub fn options(&self) -> EditorOptions {
        self.options
    }

    pub fn line_count(&self) -> u32 {
        self.buffer.line_count()
    }

    pub fn insert(&mut self, at: usize, text: &str) {
        let events = self.buffer.insert(at, text);
        self.after_edit(&events);
    }

    pub fn delete(&mut self, range: Range<usize>) {
        let events = self.buffer.delete(range);
        self.after_edit(&events);
    }

    /// Replace the whole script, as when fresh content is loaded.
    pub fn replace_all(&mut self, text: &str) {
        let events = self.buffer.replace_all(text);
        self.after_edit(&events);
    }

    /// Toggle a breakpoint on a 1-based line. Lines outside the script are
    /// ignored. Returns true if the line has a breakpoint afterwards.
    pub fn toggle_breakpoint(&mut self, line: u32) -> bool {
        if line == 0 || line > self.line_count() {
            return false;
        }
        let set = self.bookmarks.toggle_breakpoint(line);
        self.bookmarks.refresh_line_markers(&self.buffer);
        set
    }

    pub fn set_debug_point(&mut self, line: u32) -> bool {
        if line == 0 || line > self.line_count() {
            return false;
        }
        let moved = self.bookmarks.set_debug_point(line);
        self.bookmarks.refresh_line_markers(&self.buffer);
        moved
    }

    pub fn clear_debug_point(&mut self) -> bool {
        self.bookmarks.clear_debug_point()
    }

    /// Reparse the script and replace the parse error bookmarks. With code
    /// analysis off, all parse error bookmarks are cleared.
    pub fn reparse(&mut self) {
        if !self.options.code_analysis {
            self.bookmarks.sync_parse_errors(&[]);
            return;
        }
        let parse = self.grammar.parse(&self.buffer.text());
        self.bookmarks.sync_parse_errors(parse.errors());
    }

    fn after_edit(&mut self, events: &[EditEvent]) {
        if events.is_empty() {
            return;
        }
        for event in events {
            self.bookmarks.apply(event);
        }
        self.bookmarks.refresh_line_markers(&self.buffer);
        self.reparse();
    }
}

impl std::fmt::Debug for RunbookEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunbookEditor")
            .field("buffer", &self.buffer)
            .field("bookmarks", &self.bookmarks)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
