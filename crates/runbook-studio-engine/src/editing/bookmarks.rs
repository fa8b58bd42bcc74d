//! # Bookmark Store
//!
//! Bookmarks are annotations pinned to the script: breakpoints and the
//! current debug point sit on whole lines, parse errors on byte spans. The
//! store owns them, keeps their anchors in a [`PositionTracker`] so they
//! follow edits, and gives each one a [`TextMarker`](super::TextMarker) for
//! the rendering surface.
//!
//! ## Notifications
//!
//! Listeners subscribed with [`BookmarkStore::subscribe`] receive, for every
//! structural change, one [`BookmarkEvent::RedrawRequested`] followed by one
//! [`BookmarkEvent::Changed`] per bookmark that was added, moved or removed.
//! Operations that change nothing emit nothing.
//!
//! ## Invariants
//!
//! - At most one breakpoint per line, and never on line 0.
//! - At most one current debug point.
//! - Parse errors are kept in the order they were added.

use std::sync::atomic::{AtomicU64, Ordering};

use runbook_studio_syntax::SyntaxError;

use super::buffer::{EditEvent, LineIndex};
use super::observe::{Observers, SubscriptionId};
use super::text_marker::{Color, FontWeight, MarkerEvent, MarkerId, TextMarker, TextMarkerService};
use super::tracker::{AnchorPosition, PositionTracker, TrackerChange};

/// Process-unique bookmark identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookmarkId(u64);

impl BookmarkId {
    fn next() -> Self {
        static NEXT_BOOKMARK: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_BOOKMARK.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookmarkKind {
    Breakpoint,
    ParseError,
    CurrentDebugPoint,
}

impl BookmarkKind {
    /// Line bookmarks cover a whole line; the others cover a byte span.
    pub fn is_line_bookmark(self) -> bool {
        matches!(self, BookmarkKind::Breakpoint | BookmarkKind::CurrentDebugPoint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    id: BookmarkId,
    kind: BookmarkKind,
    position: AnchorPosition,
    message: Option<String>,
    marker: Option<MarkerId>,
}

impl Bookmark {
    pub fn breakpoint(line: u32) -> Self {
        Self::new(BookmarkKind::Breakpoint, AnchorPosition::Line(line), None)
    }

    pub fn debug_point(line: u32) -> Self {
        Self::new(
            BookmarkKind::CurrentDebugPoint,
            AnchorPosition::Line(line),
            None,
        )
    }

    pub fn parse_error(start: usize, len: usize, message: impl Into<String>) -> Self {
        Self::new(
            BookmarkKind::ParseError,
            AnchorPosition::Offset { start, len },
            Some(message.into()),
        )
    }

    fn new(kind: BookmarkKind, position: AnchorPosition, message: Option<String>) -> Self {
        Self {
            id: BookmarkId::next(),
            kind,
            position,
            message,
            marker: None,
        }
    }

    pub fn id(&self) -> BookmarkId {
        self.id
    }

    pub fn kind(&self) -> BookmarkKind {
        self.kind
    }

    pub fn position(&self) -> AnchorPosition {
        self.position
    }

    /// The 1-based line of a line bookmark.
    pub fn line(&self) -> Option<u32> {
        match self.position {
            AnchorPosition::Line(line) => Some(line),
            AnchorPosition::Offset { .. } => None,
        }
    }

    /// Diagnostic text of a parse error.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The render marker, unless it has been deleted.
    pub fn marker(&self) -> Option<MarkerId> {
        self.marker
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkEvent {
    RedrawRequested,
    Changed { bookmark: Bookmark, removed: bool },
}

#[derive(Debug, Default)]
pub struct BookmarkStore {
    bookmarks: Vec<Bookmark>,
    tracker: PositionTracker<BookmarkId>,
    markers: TextMarkerService,
    observers: Observers<BookmarkEvent>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.iter()
    }

    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|bookmark| bookmark.id == id)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn breakpoint_at(&self, line: u32) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.kind == BookmarkKind::Breakpoint && b.line() == Some(line))
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Bookmark> {
        self.of_kind(BookmarkKind::Breakpoint)
    }

    pub fn parse_errors(&self) -> impl Iterator<Item = &Bookmark> {
        self.of_kind(BookmarkKind::ParseError)
    }

    pub fn debug_point(&self) -> Option<&Bookmark> {
        self.of_kind(BookmarkKind::CurrentDebugPoint).next()
    }

    fn of_kind(&self, kind: BookmarkKind) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.iter().filter(move |b| b.kind == kind)
    }

    pub fn markers(&self) -> &TextMarkerService {
        &self.markers
    }

    pub fn marker_of(&self, id: BookmarkId) -> Option<&TextMarker> {
        self.get(id)?.marker.and_then(|marker| self.markers.get(marker))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BookmarkEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn subscribe_markers(
        &mut self,
        listener: impl FnMut(&MarkerEvent) + 'static,
    ) -> SubscriptionId {
        self.markers.subscribe(listener)
    }

    pub fn unsubscribe_markers(&mut self, id: SubscriptionId) -> bool {
        self.markers.unsubscribe(id)
    }

    /// Add a bookmark.
    ///
    /// Returns false without changing anything when the bookmark is a line
    /// bookmark on line 0 or a breakpoint on a line that already has one. A
    /// debug point replaces the existing one.
    pub fn add(&mut self, bookmark: Bookmark) -> bool {
        if bookmark.line() == Some(0) {
            return false;
        }
        if bookmark.kind == BookmarkKind::Breakpoint
            && let Some(line) = bookmark.line()
            && self.breakpoint_at(line).is_some()
        {
            return false;
        }

        let mut changes = Vec::new();
        if bookmark.kind == BookmarkKind::CurrentDebugPoint {
            let existing: Vec<_> = self
                .of_kind(BookmarkKind::CurrentDebugPoint)
                .map(|b| b.id)
                .collect();
            changes.extend(existing.into_iter().filter_map(|id| self.detach(id)));
        }
        let added = self.attach(bookmark);
        changes.push((added, false));

        self.publish(changes);
        true
    }

    /// Remove a bookmark. Removing one that is not in the store is a no-op.
    pub fn remove(&mut self, id: BookmarkId) -> bool {
        let Some(removed) = self.detach(id) else {
            return false;
        };
        self.publish(vec![removed]);
        true
    }

    /// Remove every bookmark of `kind` on `line`. Returns how many went.
    ///
    /// Parse errors are anchored to offsets, so they never match a line.
    pub fn remove_at(&mut self, kind: BookmarkKind, line: u32) -> usize {
        let ids: Vec<_> = self
            .of_kind(kind)
            .filter(|b| b.line() == Some(line))
            .map(|b| b.id)
            .collect();
        let removed: Vec<_> = ids.into_iter().filter_map(|id| self.detach(id)).collect();
        let count = removed.len();
        self.publish(removed);
        count
    }

    /// Add a breakpoint on `line`, or remove the one already there.
    ///
    /// Returns true if the line has a breakpoint afterwards.
    pub fn toggle_breakpoint(&mut self, line: u32) -> bool {
        match self.breakpoint_at(line).map(|b| b.id) {
            Some(id) => {
                self.remove(id);
                false
            }
            None => self.add(Bookmark::breakpoint(line)),
        }
    }

    /// Move the current debug point to `line`. Returns false if it is
    /// already there or `line` is 0.
    pub fn set_debug_point(&mut self, line: u32) -> bool {
        if self.debug_point().and_then(Bookmark::line) == Some(line) {
            return false;
        }
        self.add(Bookmark::debug_point(line))
    }

    pub fn clear_debug_point(&mut self) -> bool {
        match self.debug_point().map(|b| b.id) {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Replace all parse error bookmarks with one per diagnostic.
    ///
    /// Returns false, and notifies nobody, when the diagnostics match the
    /// current bookmarks exactly.
    pub fn sync_parse_errors(&mut self, errors: &[SyntaxError]) -> bool {
        let current: Vec<_> = self
            .parse_errors()
            .map(|b| (b.position, b.message.as_deref()))
            .collect();
        let wanted: Vec<_> = errors
            .iter()
            .map(|e| {
                let position = AnchorPosition::Offset {
                    start: e.range.start,
                    len: e.range.len(),
                };
                (position, Some(e.message.as_str()))
            })
            .collect();
        if current == wanted {
            return false;
        }

        let stale: Vec<_> = self.parse_errors().map(|b| b.id).collect();
        let mut changes: Vec<_> = stale.into_iter().filter_map(|id| self.detach(id)).collect();
        for error in errors {
            let bookmark =
                Bookmark::parse_error(error.range.start, error.range.len(), &error.message);
            changes.push((self.attach(bookmark), false));
        }

        self.publish(changes);
        true
    }

    /// Stretch each line bookmark's marker over its whole line.
    ///
    /// Line bookmarks are tracked by line number, so their markers only get
    /// real offsets here. Call after every edit and after adding line
    /// bookmarks. Markers whose line no longer exists are left alone.
    pub fn refresh_line_markers(&mut self, lines: &impl LineIndex) {
        for bookmark in &self.bookmarks {
            let (Some(line), Some(marker)) = (bookmark.line(), bookmark.marker) else {
                continue;
            };
            let Some(span) = lines.line_span(line) else {
                continue;
            };
            if let Some(mut handle) = self.markers.marker_mut(marker) {
                handle.set_span(span.start, span.len());
            }
        }
    }

    /// Move bookmarks to follow a buffer edit.
    pub fn apply(&mut self, event: &EditEvent) {
        let changes = match *event {
            EditEvent::LinesInserted { at_line, count } => {
                self.tracker.lines_inserted(at_line, count)
            }
            EditEvent::LinesDeleted { at_line, count } => {
                self.tracker.lines_deleted(at_line, count)
            }
            EditEvent::CharactersInserted { at, len } => self.tracker.chars_inserted(at, len),
            EditEvent::CharactersRemoved { at, len } => self.tracker.chars_removed(at, len),
        };

        let mut published = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                TrackerChange::Moved { key, position } => {
                    if let Some(moved) = self.relocate(key, position) {
                        published.push((moved, false));
                    }
                }
                TrackerChange::Removed { key, .. } => {
                    if let Some(removed) = self.detach(key) {
                        published.push(removed);
                    }
                }
            }
        }
        self.publish(published);
    }

    /// Delete a bookmark's marker, leaving the bookmark without one.
    pub fn delete_marker(&mut self, id: BookmarkId) -> bool {
        let Some(bookmark) = self.bookmarks.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        let Some(marker) = bookmark.marker.take() else {
            return false;
        };
        self.markers.delete(marker)
    }

    /// Start tracking a bookmark and give it a styled marker.
    fn attach(&mut self, mut bookmark: Bookmark) -> Bookmark {
        let (start, len) = match bookmark.position {
            AnchorPosition::Offset { start, len } => (start, len),
            // Spanned over the line by refresh_line_markers
            AnchorPosition::Line(_) => (0, 0),
        };
        let marker = self.markers.create(start, len);
        if let Some(mut handle) = self.markers.marker_mut(marker) {
            handle.set_tag(Some(format!("{:?}", bookmark.kind)));
            match bookmark.kind {
                BookmarkKind::Breakpoint => {
                    handle.set_background(Some(Color::BREAKPOINT_RED));
                    handle.set_foreground(Some(Color::WHITE));
                    handle.set_marker_color(Some(Color::BREAKPOINT_RED));
                }
                BookmarkKind::CurrentDebugPoint => {
                    handle.set_background(Some(Color::DEBUG_YELLOW));
                    handle.set_font_weight(Some(FontWeight::Bold));
                }
                BookmarkKind::ParseError => {
                    handle.set_marker_color(Some(Color::ERROR_RED));
                    handle.set_tooltip(bookmark.message.clone());
                }
            }
        }

        bookmark.marker = Some(marker);
        self.tracker.track(bookmark.id, bookmark.position);
        self.bookmarks.push(bookmark.clone());
        bookmark
    }

    /// Stop tracking a bookmark and delete its marker.
    fn detach(&mut self, id: BookmarkId) -> Option<(Bookmark, bool)> {
        let index = self.bookmarks.iter().position(|b| b.id == id)?;
        let bookmark = self.bookmarks.remove(index);
        self.tracker.untrack(id);
        if let Some(marker) = bookmark.marker {
            self.markers.delete(marker);
        }
        Some((bookmark, true))
    }

    fn relocate(&mut self, id: BookmarkId, position: AnchorPosition) -> Option<Bookmark> {
        let bookmark = self.bookmarks.iter_mut().find(|b| b.id == id)?;
        bookmark.position = position;
        if let (AnchorPosition::Offset { start, len }, Some(marker)) = (position, bookmark.marker)
            && let Some(mut handle) = self.markers.marker_mut(marker)
        {
            handle.set_span(start, len);
        }
        Some(bookmark.clone())
    }

    fn publish(&mut self, changes: Vec<(Bookmark, bool)>) {
        if changes.is_empty() {
            return;
        }
        self.observers.notify(&BookmarkEvent::RedrawRequested);
        for (bookmark, removed) in changes {
            self.observers.notify(&BookmarkEvent::Changed { bookmark, removed });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::buffer::ScriptBuffer;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_store() -> (BookmarkStore, Rc<RefCell<Vec<BookmarkEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = BookmarkStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        (store, events)
    }

    fn summary(events: &[BookmarkEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                BookmarkEvent::RedrawRequested => "redraw".to_string(),
                BookmarkEvent::Changed { bookmark, removed } => format!(
                    "{}{:?}@{:?}",
                    if *removed { "-" } else { "+" },
                    bookmark.kind(),
                    bookmark.position()
                ),
            })
            .collect()
    }

    fn breakpoint_lines(store: &BookmarkStore) -> Vec<u32> {
        store.breakpoints().filter_map(Bookmark::line).collect()
    }

    #[test]
    fn add_notifies_redraw_then_change() {
        let (mut store, events) = recording_store();

        assert!(store.add(Bookmark::breakpoint(3)));

        assert_eq!(
            summary(&events.borrow()),
            vec!["redraw", "+Breakpoint@Line(3)"]
        );
    }

    #[test]
    fn second_breakpoint_on_a_line_is_rejected() {
        let (mut store, events) = recording_store();
        store.add(Bookmark::breakpoint(3));
        events.borrow_mut().clear();

        assert!(!store.add(Bookmark::breakpoint(3)));

        assert_eq!(store.len(), 1);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn line_zero_is_rejected() {
        let mut store = BookmarkStore::new();
        assert!(!store.add(Bookmark::breakpoint(0)));
        assert!(!store.set_debug_point(0));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_absent_bookmark_is_silent() {
        let (mut store, events) = recording_store();
        let bookmark = Bookmark::breakpoint(2);
        let id = bookmark.id();

        assert!(!store.remove(id));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn remove_at_removes_only_matching_kind() {
        let (mut store, events) = recording_store();
        store.add(Bookmark::breakpoint(4));
        store.add(Bookmark::debug_point(4));
        events.borrow_mut().clear();

        assert_eq!(store.remove_at(BookmarkKind::Breakpoint, 4), 1);

        assert_eq!(
            summary(&events.borrow()),
            vec!["redraw", "-Breakpoint@Line(4)"]
        );
        assert!(store.debug_point().is_some());
        assert_eq!(store.remove_at(BookmarkKind::Breakpoint, 4), 0);
    }

    #[test]
    fn toggle_breakpoint_adds_then_removes() {
        let mut store = BookmarkStore::new();
        assert!(store.toggle_breakpoint(7));
        assert_eq!(breakpoint_lines(&store), vec![7]);
        assert!(!store.toggle_breakpoint(7));
        assert!(store.is_empty());
        assert!(store.markers().is_empty());
    }

    #[test]
    fn only_one_debug_point() {
        let (mut store, events) = recording_store();
        store.set_debug_point(2);
        events.borrow_mut().clear();

        assert!(store.set_debug_point(5));
        assert!(!store.set_debug_point(5));

        assert_eq!(
            summary(&events.borrow()),
            vec![
                "redraw",
                "-CurrentDebugPoint@Line(2)",
                "+CurrentDebugPoint@Line(5)"
            ]
        );
        assert_eq!(store.debug_point().and_then(Bookmark::line), Some(5));
        assert!(store.clear_debug_point());
        assert!(!store.clear_debug_point());
    }

    #[test]
    fn line_edits_move_and_remove_breakpoints() {
        let (mut store, events) = recording_store();
        for line in [2, 4, 6] {
            store.add(Bookmark::breakpoint(line));
        }
        events.borrow_mut().clear();

        store.apply(&EditEvent::LinesDeleted {
            at_line: 4,
            count: 1,
        });

        assert_eq!(breakpoint_lines(&store), vec![2, 5]);
        assert_eq!(
            summary(&events.borrow()),
            vec!["redraw", "-Breakpoint@Line(4)", "+Breakpoint@Line(5)"]
        );

        store.apply(&EditEvent::LinesInserted {
            at_line: 1,
            count: 2,
        });
        assert_eq!(breakpoint_lines(&store), vec![4, 7]);
    }

    #[test]
    fn edits_that_move_nothing_notify_nothing() {
        let (mut store, events) = recording_store();
        store.add(Bookmark::breakpoint(2));
        events.borrow_mut().clear();

        store.apply(&EditEvent::LinesInserted {
            at_line: 5,
            count: 1,
        });
        store.apply(&EditEvent::CharactersInserted { at: 0, len: 3 });

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn parse_errors_follow_character_edits() {
        let mut store = BookmarkStore::new();
        store.add(Bookmark::parse_error(10, 3, "unexpected `)`"));
        let id = store.parse_errors().next().unwrap().id();

        store.apply(&EditEvent::CharactersInserted { at: 2, len: 5 });

        assert_eq!(
            store.get(id).unwrap().position(),
            AnchorPosition::Offset { start: 15, len: 3 }
        );
        let marker = store.marker_of(id).unwrap();
        assert_eq!((marker.start(), marker.len()), (15, 3));
        assert_eq!(marker.tooltip(), Some("unexpected `)`"));
    }

    #[test]
    fn sync_parse_errors_replaces_and_skips_when_unchanged() {
        let (mut store, events) = recording_store();
        store.add(Bookmark::breakpoint(1));
        let errors = vec![
            SyntaxError {
                message: "expected function body".to_string(),
                range: 4..5,
            },
            SyntaxError {
                message: "missing closing `}`".to_string(),
                range: 20..20,
            },
        ];

        assert!(store.sync_parse_errors(&errors));
        assert_eq!(store.parse_errors().count(), 2);
        events.borrow_mut().clear();

        assert!(!store.sync_parse_errors(&errors));
        assert!(events.borrow().is_empty());

        assert!(store.sync_parse_errors(&[]));
        assert_eq!(store.parse_errors().count(), 0);
        assert_eq!(breakpoint_lines(&store), vec![1]);
        assert_eq!(
            summary(&events.borrow()),
            vec![
                "redraw",
                "-ParseError@Offset { start: 4, len: 1 }",
                "-ParseError@Offset { start: 20, len: 0 }"
            ]
        );
    }

    #[test]
    fn parse_errors_on_the_same_offset_keep_their_order() {
        let (mut store, events) = recording_store();
        let errors: Vec<_> = ["unexpected `)`", "expected parameter", "missing closing `]`"]
            .into_iter()
            .map(|message| SyntaxError {
                message: message.to_string(),
                range: 7..8,
            })
            .collect();

        let expected = vec!["unexpected `)`", "expected parameter", "missing closing `]`"];

        store.sync_parse_errors(&errors);
        let notified: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BookmarkEvent::Changed { bookmark, .. } => bookmark.message().map(str::to_string),
                BookmarkEvent::RedrawRequested => None,
            })
            .collect();
        assert_eq!(notified, expected);

        store.apply(&EditEvent::CharactersInserted { at: 0, len: 2 });

        let messages: Vec<_> = store.parse_errors().filter_map(Bookmark::message).collect();
        assert_eq!(messages, expected);
        assert!(
            store
                .parse_errors()
                .all(|b| b.position() == AnchorPosition::Offset { start: 9, len: 1 })
        );
    }

    #[test]
    fn line_markers_span_their_line() {
        let buffer = ScriptBuffer::new("Get-Date\n  Write-Output 1\n");
        let mut store = BookmarkStore::new();
        store.add(Bookmark::breakpoint(2));
        let id = store.breakpoints().next().unwrap().id();

        store.refresh_line_markers(&buffer);

        let marker = store.marker_of(id).unwrap();
        assert_eq!((marker.start(), marker.end()), (9, 25));
        assert_eq!(marker.background(), Some(Color::BREAKPOINT_RED));
    }

    #[test]
    fn deleting_a_marker_detaches_it() {
        let mut store = BookmarkStore::new();
        store.add(Bookmark::breakpoint(1));
        let id = store.breakpoints().next().unwrap().id();

        assert!(store.delete_marker(id));

        assert_eq!(store.get(id).unwrap().marker(), None);
        assert!(store.markers().is_empty());
        assert!(!store.delete_marker(id));
    }
}
