/*!
 * # Editing Core
 *
 * Everything that has to stay consistent while a runbook is being edited.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The script is stored in one **`xi_rope::Rope`** inside [`ScriptBuffer`]
 * - Every edit returns the **`EditEvent`s** it caused: character deltas and
 *   line deltas, in document order
 *
 * ### 2. Anchors Follow Deltas
 * - [`PositionTracker`] holds anchors as either a 1-based line or a byte span
 * - Line anchors move with line deltas, span anchors with character deltas
 * - A line anchor whose line is deleted is dropped and reported once
 *
 * ### 3. Bookmarks Own Their Markers
 * - [`BookmarkStore`] keeps breakpoints, the current debug point and parse
 *   errors, each anchored in its own tracker
 * - Each bookmark has one [`TextMarker`] in the store's [`TextMarkerService`];
 *   the marker only knows its span and styling
 *
 * ### 4. Explicit Notifications
 * - Stores and marker services expose plain observer lists
 *   (`subscribe` / `unsubscribe`)
 * - A structural change emits one redraw request and then one change
 *   notification per affected bookmark
 *
 * ## Module Structure
 *
 * - **`buffer`**: rope-backed text and edit events
 * - **`tracker`**: line and span anchors
 * - **`text_marker`**: styled spans and redraw signals
 * - **`bookmarks`**: the annotation store
 * - **`editor`**: [`RunbookEditor`], wiring the above to the script grammar
 * - **`observe`**: observer lists
 *
 * ## Usage Pattern
 *
 * ```rust
 * use runbook_studio_engine::editing::*;
 *
 * let mut editor = RunbookEditor::new(
 *     "workflow Demo {\n    Get-Date\n}\n",
 *     EditorOptions::default(),
 * );
 *
 * editor.toggle_breakpoint(2);
 * editor.insert(0, "# comment\n");
 *
 * let line = editor.bookmarks().breakpoints().next().and_then(Bookmark::line);
 * assert_eq!(line, Some(3));
 * ```
 */

pub mod bookmarks;
pub mod buffer;
pub mod editor;
pub mod observe;
pub mod text_marker;
pub mod tracker;

pub use bookmarks::{Bookmark, BookmarkEvent, BookmarkId, BookmarkKind, BookmarkStore};
pub use buffer::{EditEvent, LineIndex, ScriptBuffer};
pub use editor::{EditorOptions, RunbookEditor};
pub use observe::{Observers, SubscriptionId};
pub use text_marker::{
    Color, FontStyle, FontWeight, MarkerEvent, MarkerId, TextMarker, TextMarkerMut,
    TextMarkerService,
};
pub use tracker::{AnchorPosition, PositionTracker, TrackerChange};
