//! # Position Tracker
//!
//! Keeps a set of anchors pointing into a document consistent while the
//! document is edited. An anchor is either a whole line (1-based line number)
//! or a byte span. Line anchors only react to line deltas and offset anchors
//! only react to character deltas; the buffer reports both for every edit.
//!
//! Every notification returns the anchors it affected, so the owner can
//! update whatever hangs off them without diffing.

/// Where an anchor currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorPosition {
    /// 1-based line number
    Line(u32),
    /// Byte span
    Offset { start: usize, len: usize },
}

/// An anchor affected by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerChange<K> {
    /// The anchor now points at `position`.
    Moved { key: K, position: AnchorPosition },
    /// The anchor's line was deleted. `position` is where it was.
    Removed { key: K, position: AnchorPosition },
}

impl<K: Copy> TrackerChange<K> {
    pub fn key(&self) -> K {
        match self {
            TrackerChange::Moved { key, .. } | TrackerChange::Removed { key, .. } => *key,
        }
    }
}

/// Ordered set of anchors keyed by `K`.
///
/// Anchors keep their insertion order, which is also the order changes are
/// reported in.
#[derive(Debug, Clone)]
pub struct PositionTracker<K> {
    anchors: Vec<(K, AnchorPosition)>,
}

impl<K> Default for PositionTracker<K> {
    fn default() -> Self {
        Self {
            anchors: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> PositionTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `key`, replacing its position if already tracked.
    pub fn track(&mut self, key: K, position: AnchorPosition) {
        match self.anchors.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = position,
            None => self.anchors.push((key, position)),
        }
    }

    pub fn untrack(&mut self, key: K) -> Option<AnchorPosition> {
        let index = self.anchors.iter().position(|(k, _)| *k == key)?;
        Some(self.anchors.remove(index).1)
    }

    pub fn position(&self, key: K) -> Option<AnchorPosition> {
        self.anchors
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, position)| *position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, AnchorPosition)> + '_ {
        self.anchors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// `count` lines were inserted before line `at_line`.
    ///
    /// Line anchors at or after `at_line` move down by `count`.
    pub fn lines_inserted(&mut self, at_line: u32, count: u32) -> Vec<TrackerChange<K>> {
        let mut changes = Vec::new();
        if count == 0 {
            return changes;
        }

        for (key, position) in &mut self.anchors {
            if let AnchorPosition::Line(line) = position
                && *line >= at_line
            {
                *line = line.saturating_add(count);
                changes.push(TrackerChange::Moved {
                    key: *key,
                    position: *position,
                });
            }
        }

        changes
    }

    /// Lines `at_line .. at_line + count` were deleted.
    ///
    /// Anchors on a deleted line are dropped; anchors below move up by
    /// `count`.
    pub fn lines_deleted(&mut self, at_line: u32, count: u32) -> Vec<TrackerChange<K>> {
        let mut changes = Vec::new();
        if count == 0 {
            return changes;
        }
        let end = at_line.saturating_add(count);

        self.anchors.retain_mut(|(key, position)| {
            let AnchorPosition::Line(line) = position else {
                return true;
            };
            if *line >= at_line && *line < end {
                changes.push(TrackerChange::Removed {
                    key: *key,
                    position: *position,
                });
                return false;
            }
            if *line >= end {
                *line -= count;
                changes.push(TrackerChange::Moved {
                    key: *key,
                    position: *position,
                });
            }
            true
        });

        changes
    }

    /// `len` bytes were inserted at byte offset `at`.
    ///
    /// Spans starting at or after `at` shift right. A span with `at` strictly
    /// inside it grows to cover the inserted text.
    pub fn chars_inserted(&mut self, at: usize, len: usize) -> Vec<TrackerChange<K>> {
        let mut changes = Vec::new();
        if len == 0 {
            return changes;
        }

        for (key, position) in &mut self.anchors {
            let AnchorPosition::Offset { start, len: span } = position else {
                continue;
            };
            if *start >= at {
                *start += len;
            } else if at < *start + *span {
                *span += len;
            } else {
                continue;
            }
            changes.push(TrackerChange::Moved {
                key: *key,
                position: *position,
            });
        }

        changes
    }

    /// Bytes `at .. at + len` were removed.
    ///
    /// Spans after the range shift left. Spans overlapping it keep only the
    /// bytes that survive; a span starting inside it collapses to `at`.
    pub fn chars_removed(&mut self, at: usize, len: usize) -> Vec<TrackerChange<K>> {
        let mut changes = Vec::new();
        if len == 0 {
            return changes;
        }
        let removed_end = at + len;

        for (key, position) in &mut self.anchors {
            let AnchorPosition::Offset { start, len: span } = position else {
                continue;
            };
            let span_end = *start + *span;
            let (new_start, new_end) = if *start >= removed_end {
                (*start - len, span_end - len)
            } else if span_end <= at {
                continue;
            } else {
                let kept_before = at.saturating_sub(*start);
                let kept_after = span_end.saturating_sub(removed_end);
                let new_start = (*start).min(at);
                (new_start, new_start + kept_before + kept_after)
            };

            if (new_start, new_end - new_start) == (*start, *span) {
                continue;
            }
            *start = new_start;
            *span = new_end - new_start;
            changes.push(TrackerChange::Moved {
                key: *key,
                position: *position,
            });
        }

        changes
    }
}
