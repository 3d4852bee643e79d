//! The boundary between the engine and the presentation layer.
//!
//! The engine never owns visual nodes.  It holds [`ElementId`] back-references,
//! reads geometry through [`Geometry`], and emits [`Write`]s that are applied
//! through [`Surface`] at the very end of a frame.  [`ElementTable`] is the
//! in-memory implementation used by the terminal front-end and the tests.

use std::collections::BTreeMap;

use super::error::EngineError;
use super::geometry::{Rect, Vec2};

// ───────────────────────────────────────── handles ───────────

/// Opaque handle to an element owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// A single property write produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Write {
    Translate(Axis, f64),
    /// Degrees.
    Rotate(f64),
    Opacity(f64),
    Scale(f64),
    /// Absolute placement inside the parent (CSS `left` / `top`).
    Position(Axis, f64),
    /// Vertical compensation that holds a pinned element in place.
    PinOffset(f64),
    DragOffset(Vec2),
    /// Drag affordance overlay shown / hidden.
    Affordance(bool),
}

// ───────────────────────────────────────── traits ────────────

/// Read-only geometry queries.  All rects are viewport-relative.
pub trait Geometry {
    /// Untransformed layout box.  `None` once the element is gone.
    fn layout_rect(&self, id: ElementId) -> Option<Rect>;

    /// Box as currently painted, transforms included.
    fn bounding_rect(&self, id: ElementId) -> Option<Rect> {
        self.layout_rect(id)
    }
}

/// Geometry plus the ability to receive writes.
pub trait Surface: Geometry {
    fn apply(&mut self, id: ElementId, write: Write) -> Result<(), EngineError>;
}

// ───────────────────────────────────────── write batch ───────

/// Writes collected during a frame, applied in one pass after every
/// component has finished computing.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<(ElementId, Write)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ElementId, write: Write) {
        self.writes.push((id, write));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (ElementId, Write)> {
        self.writes.iter()
    }

    /// Apply everything to `surface`.  Writes whose target vanished are
    /// skipped.  Returns the number of writes that landed.
    pub fn apply(self, surface: &mut dyn Surface) -> usize {
        let mut applied = 0;
        for (id, write) in self.writes {
            match surface.apply(id, write) {
                Ok(()) => applied += 1,
                Err(err) => tracing::trace!("skipping write {write:?}: {err}"),
            }
        }
        applied
    }
}

// ───────────────────────────────────────── element table ─────

/// Visual state of one element as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementState {
    /// Layout box.  Document coordinates, or relative to `parent` when set.
    pub layout: Rect,
    /// Fixed elements ignore the scroll offset (the custom cursor).
    pub fixed: bool,
    pub parent: Option<ElementId>,
    pub translate: Vec2,
    pub pin_offset: f64,
    pub drag_offset: Vec2,
    pub rotate: f64,
    pub scale: f64,
    pub opacity: f64,
    pub affordance: bool,
}

impl ElementState {
    pub fn new(layout: Rect) -> Self {
        Self {
            layout,
            fixed: false,
            parent: None,
            translate: Vec2::ZERO,
            pin_offset: 0.0,
            drag_offset: Vec2::ZERO,
            rotate: 0.0,
            scale: 1.0,
            opacity: 1.0,
            affordance: false,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Total transform offset (translate + pin + drag).
    pub fn offset(&self) -> Vec2 {
        self.translate + self.drag_offset + Vec2::new(0.0, self.pin_offset)
    }
}

/// Arena of elements keyed by [`ElementId`].
#[derive(Debug, Default)]
pub struct ElementTable {
    elements: BTreeMap<ElementId, ElementState>,
    next_id: u32,
    scroll_offset: f64,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: ElementState) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, state);
        id
    }

    /// Remove an element and every element parented to it.
    pub fn remove(&mut self, id: ElementId) {
        self.elements.remove(&id);
        let orphans: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, e)| e.parent == Some(id))
            .map(|(&child, _)| child)
            .collect();
        for child in orphans {
            self.remove(child);
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementState> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementState> {
        self.elements.get_mut(&id)
    }

    /// Feed the current scroll position.  Viewport rects are derived from it.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Layout origin in viewport coordinates, walking up the parent chain.
    fn viewport_origin(&self, id: ElementId) -> Option<Vec2> {
        let e = self.elements.get(&id)?;
        match e.parent {
            Some(parent) => {
                let parent_origin = self.painted_origin(parent)?;
                Some(parent_origin + e.layout.origin())
            }
            None if e.fixed => Some(e.layout.origin()),
            None => Some(e.layout.origin() - Vec2::new(0.0, self.scroll_offset)),
        }
    }

    fn painted_origin(&self, id: ElementId) -> Option<Vec2> {
        let origin = self.viewport_origin(id)?;
        Some(origin + self.elements.get(&id)?.offset())
    }
}

impl Geometry for ElementTable {
    fn layout_rect(&self, id: ElementId) -> Option<Rect> {
        let e = self.elements.get(&id)?;
        let origin = self.viewport_origin(id)?;
        Some(Rect::new(origin.x, origin.y, e.layout.width, e.layout.height))
    }

    fn bounding_rect(&self, id: ElementId) -> Option<Rect> {
        let e = self.elements.get(&id)?;
        let origin = self.painted_origin(id)?;
        Some(Rect::new(origin.x, origin.y, e.layout.width, e.layout.height))
    }
}

impl Surface for ElementTable {
    fn apply(&mut self, id: ElementId, write: Write) -> Result<(), EngineError> {
        let e = self
            .elements
            .get_mut(&id)
            .ok_or(EngineError::MissingTarget(id))?;
        match write {
            Write::Translate(Axis::X, v) => e.translate.x = v,
            Write::Translate(Axis::Y, v) => e.translate.y = v,
            Write::Rotate(v) => e.rotate = v,
            Write::Opacity(v) => e.opacity = v.clamp(0.0, 1.0),
            Write::Scale(v) => e.scale = v,
            Write::Position(Axis::X, v) => e.layout.x = v,
            Write::Position(Axis::Y, v) => e.layout.y = v,
            Write::PinOffset(v) => e.pin_offset = v,
            Write::DragOffset(v) => e.drag_offset = v,
            Write::Affordance(v) => e.affordance = v,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_rects_follow_scroll_unless_fixed() {
        let mut table = ElementTable::new();
        let body = table.insert(ElementState::new(Rect::new(0.0, 50.0, 10.0, 5.0)));
        let cursor = table.insert(ElementState::new(Rect::new(3.0, 3.0, 1.0, 1.0)).fixed());
        table.set_scroll_offset(20.0);
        assert_eq!(table.layout_rect(body).map(|r| r.y), Some(30.0));
        assert_eq!(table.layout_rect(cursor).map(|r| r.y), Some(3.0));
    }

    #[test]
    fn children_are_placed_relative_to_painted_parent() {
        let mut table = ElementTable::new();
        let section = table.insert(ElementState::new(Rect::new(0.0, 100.0, 80.0, 24.0)));
        let arrow = table.insert(ElementState::new(Rect::new(5.0, 2.0, 3.0, 1.0)).child_of(section));
        table.set_scroll_offset(90.0);
        table
            .apply(section, Write::Translate(Axis::X, 4.0))
            .expect("section exists");
        let r = table.layout_rect(arrow).expect("arrow exists");
        assert_eq!((r.x, r.y), (9.0, 12.0));
    }

    #[test]
    fn batch_skips_missing_targets() {
        let mut table = ElementTable::new();
        let a = table.insert(ElementState::new(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let b = table.insert(ElementState::new(Rect::new(0.0, 0.0, 1.0, 1.0)));
        table.remove(b);

        let mut batch = WriteBatch::new();
        batch.push(b, Write::Opacity(0.5));
        batch.push(a, Write::Opacity(0.25));
        assert_eq!(batch.apply(&mut table), 1);
        assert_eq!(table.get(a).map(|e| e.opacity), Some(0.25));
    }

    #[test]
    fn removing_parent_removes_children() {
        let mut table = ElementTable::new();
        let p = table.insert(ElementState::new(Rect::default()));
        let c = table.insert(ElementState::new(Rect::default()).child_of(p));
        table.remove(p);
        assert!(table.get(c).is_none());
    }
}
