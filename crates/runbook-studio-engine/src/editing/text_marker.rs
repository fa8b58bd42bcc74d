//! # Text Markers
//!
//! A text marker is a styled span the rendering surface draws over the
//! script: the red band of a breakpoint line, the squiggle under a parse
//! error. Markers know nothing about why they exist; they only hold a span
//! and styling, and tell whoever listens when they need to be redrawn.
//!
//! Markers live in a [`TextMarkerService`] and are changed through a
//! short-lived [`TextMarkerMut`] handle. Every styling setter compares before
//! writing, so a write that does not change the value produces no redraw.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::observe::{Observers, SubscriptionId};

/// Process-unique marker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl MarkerId {
    fn next() -> Self {
        static NEXT_MARKER: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_MARKER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BREAKPOINT_RED: Color = Color::rgb(0xB4, 0x26, 0x26);
    pub const DEBUG_YELLOW: Color = Color::rgb(0xFF, 0xE5, 0x6B);
    pub const ERROR_RED: Color = Color::rgb(0xE5, 0x14, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
}

/// A styled span over the script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMarker {
    id: MarkerId,
    start: usize,
    len: usize,
    background: Option<Color>,
    foreground: Option<Color>,
    font_weight: Option<FontWeight>,
    font_style: Option<FontStyle>,
    marker_color: Option<Color>,
    tag: Option<String>,
    tooltip: Option<String>,
}

impl TextMarker {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    pub fn font_weight(&self) -> Option<FontWeight> {
        self.font_weight
    }

    pub fn font_style(&self) -> Option<FontStyle> {
        self.font_style
    }

    /// Colour of the underline or gutter mark.
    pub fn marker_color(&self) -> Option<Color> {
        self.marker_color
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }
}

/// Notifications from a [`TextMarkerService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    /// The marker's span or styling changed.
    Redraw(MarkerId),
    /// The marker was deleted. Always the last event for that marker.
    Deleted(MarkerId),
}

/// Owns every text marker of one document.
#[derive(Debug, Default)]
pub struct TextMarkerService {
    markers: BTreeMap<MarkerId, TextMarker>,
    observers: Observers<MarkerEvent>,
}

impl TextMarkerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unstyled marker over `start .. start + len`.
    pub fn create(&mut self, start: usize, len: usize) -> MarkerId {
        let id = MarkerId::next();
        self.markers.insert(
            id,
            TextMarker {
                id,
                start,
                len,
                background: None,
                foreground: None,
                font_weight: None,
                font_style: None,
                marker_color: None,
                tag: None,
                tooltip: None,
            },
        );
        self.observers.notify(&MarkerEvent::Redraw(id));
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&TextMarker> {
        self.markers.get(&id)
    }

    /// Handle for changing a marker, or `None` if it does not exist.
    pub fn marker_mut(&mut self, id: MarkerId) -> Option<TextMarkerMut<'_>> {
        self.markers
            .contains_key(&id)
            .then_some(TextMarkerMut { service: self, id })
    }

    /// Delete a marker. Returns false if it did not exist.
    pub fn delete(&mut self, id: MarkerId) -> bool {
        if self.markers.remove(&id).is_none() {
            return false;
        }
        self.observers.notify(&MarkerEvent::Redraw(id));
        self.observers.notify(&MarkerEvent::Deleted(id));
        true
    }

    /// Markers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &TextMarker> {
        self.markers.values()
    }

    /// Markers whose span contains `offset`.
    pub fn at_offset(&self, offset: usize) -> impl Iterator<Item = &TextMarker> {
        self.markers
            .values()
            .filter(move |marker| marker.start <= offset && offset < marker.end())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&MarkerEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Mutable access to one marker.
pub struct TextMarkerMut<'a> {
    service: &'a mut TextMarkerService,
    id: MarkerId,
}

impl TextMarkerMut<'_> {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn set_span(&mut self, start: usize, len: usize) -> bool {
        let moved = self.update(|marker| &mut marker.start, start);
        let resized = self.update(|marker| &mut marker.len, len);
        (moved || resized) && self.redraw()
    }

    pub fn set_background(&mut self, color: Option<Color>) -> bool {
        self.update(|marker| &mut marker.background, color) && self.redraw()
    }

    pub fn set_foreground(&mut self, color: Option<Color>) -> bool {
        self.update(|marker| &mut marker.foreground, color) && self.redraw()
    }

    pub fn set_font_weight(&mut self, weight: Option<FontWeight>) -> bool {
        self.update(|marker| &mut marker.font_weight, weight) && self.redraw()
    }

    pub fn set_font_style(&mut self, style: Option<FontStyle>) -> bool {
        self.update(|marker| &mut marker.font_style, style) && self.redraw()
    }

    pub fn set_marker_color(&mut self, color: Option<Color>) -> bool {
        self.update(|marker| &mut marker.marker_color, color) && self.redraw()
    }

    /// Opaque caller data. Never triggers a redraw.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.update(|marker| &mut marker.tag, tag);
    }

    /// Never triggers a redraw; tooltips are read on hover.
    pub fn set_tooltip(&mut self, tooltip: Option<String>) {
        self.update(|marker| &mut marker.tooltip, tooltip);
    }

    /// Delete the marker through its owning service.
    pub fn delete(self) -> bool {
        self.service.delete(self.id)
    }

    /// Write `value` into the field if it differs. Returns whether it changed.
    fn update<T: PartialEq>(
        &mut self,
        field: impl FnOnce(&mut TextMarker) -> &mut T,
        value: T,
    ) -> bool {
        let Some(marker) = self.service.markers.get_mut(&self.id) else {
            return false;
        };
        let slot = field(marker);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    fn redraw(&mut self) -> bool {
        self.service.observers.notify(&MarkerEvent::Redraw(self.id));
        true
    }
}
