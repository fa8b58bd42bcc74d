//! Rope-backed script buffer.
//!
//! The buffer is the single source of truth for the script text. Each edit
//! returns the deltas it caused, in document order, so anchors can follow the
//! text without re-reading it.

use std::borrow::Cow;
use std::ops::Range;

use xi_rope::{LinesMetric, Rope};

/// A change to the buffer, as seen by position anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    CharactersInserted { at: usize, len: usize },
    CharactersRemoved { at: usize, len: usize },
    /// `count` lines now start before what used to be line `at_line` (1-based).
    LinesInserted { at_line: u32, count: u32 },
    /// Lines `at_line .. at_line + count` (1-based) no longer exist.
    LinesDeleted { at_line: u32, count: u32 },
}

/// Line lookups over a text.
pub trait LineIndex {
    fn line_count(&self) -> u32;

    /// Byte span of a 1-based line, without its line ending.
    fn line_span(&self, line: u32) -> Option<Range<usize>>;
}

#[derive(Debug, Clone, Default)]
pub struct ScriptBuffer {
    rope: Rope,
}

impl ScriptBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len() == 0
    }

    pub fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = self.char_boundary(range.start);
        let end = self.char_boundary(range.end).max(start);
        self.rope.slice_to_cow(start..end)
    }

    /// 1-based line containing byte `offset`.
    pub fn line_of_offset(&self, offset: usize) -> u32 {
        let line = self.rope.line_of_offset(offset.min(self.len()));
        u32::try_from(line + 1).unwrap_or(u32::MAX)
    }

    /// Insert `text` at byte offset `at`. Offsets past the end append and
    /// offsets inside a character move back to its start.
    pub fn insert(&mut self, at: usize, text: &str) -> Vec<EditEvent> {
        if text.is_empty() {
            return Vec::new();
        }
        let at = self.char_boundary(at);
        let first_line = self.first_shifted_line(at);

        self.rope.edit(at..at, text);

        let mut events = vec![EditEvent::CharactersInserted {
            at,
            len: text.len(),
        }];
        let count = count_lines(text);
        if count > 0 {
            events.push(EditEvent::LinesInserted {
                at_line: first_line,
                count,
            });
        }
        events
    }

    /// Delete the bytes in `range`, clamped to the buffer. Ends inside a
    /// character move back to its start.
    pub fn delete(&mut self, range: Range<usize>) -> Vec<EditEvent> {
        let start = self.char_boundary(range.start);
        let end = self.char_boundary(range.end);
        if start >= end {
            return Vec::new();
        }
        let first_line = self.first_shifted_line(start);
        let count = count_lines(&self.rope.slice_to_cow(start..end));

        self.rope.edit(start..end, "");

        let mut events = vec![EditEvent::CharactersRemoved {
            at: start,
            len: end - start,
        }];
        if count > 0 {
            events.push(EditEvent::LinesDeleted {
                at_line: first_line,
                count,
            });
        }
        events
    }

    /// Replace the whole text.
    pub fn replace_all(&mut self, text: &str) -> Vec<EditEvent> {
        let mut events = self.delete(0..self.len());
        events.extend(self.insert(0, text));
        events
    }

    /// `offset` clamped to the buffer and moved back to a char boundary.
    fn char_boundary(&self, offset: usize) -> usize {
        if offset >= self.len() {
            return self.len();
        }
        self.rope.at_or_prev_codepoint_boundary(offset).unwrap_or(0)
    }

    /// First line whose anchors move when text changes at `offset`: the line
    /// itself at column 0, otherwise the line after it.
    fn first_shifted_line(&self, offset: usize) -> u32 {
        let line = self.line_of_offset(offset);
        let line_start = self.rope.offset_of_line(line as usize - 1);
        if offset == line_start { line } else { line + 1 }
    }
}

fn count_lines(text: &str) -> u32 {
    u32::try_from(text.matches('\n').count()).unwrap_or(u32::MAX)
}

impl LineIndex for ScriptBuffer {
    fn line_count(&self) -> u32 {
        let breaks = self.rope.measure::<LinesMetric>();
        u32::try_from(breaks + 1).unwrap_or(u32::MAX)
    }

    fn line_span(&self, line: u32) -> Option<Range<usize>> {
        if line == 0 || line > self.line_count() {
            return None;
        }
        let start = self.rope.offset_of_line(line as usize - 1);
        let next = if line < self.line_count() {
            self.rope.offset_of_line(line as usize)
        } else {
            self.len()
        };
        let raw = self.rope.slice_to_cow(start..next);
        let content = raw.trim_end_matches('\n').trim_end_matches('\r');
        Some(start..start + content.len())
    }
}

impl From<&str> for ScriptBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
