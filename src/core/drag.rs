//! Free-form dragging with edge resistance and inertia.
//!
//! Each draggable moves through `Idle → Dragging → Settling → Idle`
//! independently of the others.  While dragging, the offset follows the
//! pointer but is squashed into a small overshoot band past the container
//! edges.  On release the element keeps the velocity of its last 100 ms of
//! movement, decaying every frame and stopping at the container edges,
//! until it is slow enough to rest.
//!
//! Container bounds are read from the surface whenever they are needed, so
//! a resized container is picked up on the next frame.

use std::collections::VecDeque;

use super::error::EngineError;
use super::geometry::{OffsetBounds, Vec2};
use super::scope::Liveness;
use super::surface::{ElementId, Geometry, Write, WriteBatch};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Furthest a drag may stretch past an edge, as a fraction of the
    /// allowed range on that axis.
    pub overshoot: f64,
    /// Seconds for release velocity to decay by a factor of e.
    pub inertia: f64,
    /// Speed (units/s) below which a settling element comes to rest.
    pub rest_speed: f64,
    /// Scale applied while the element is held.
    pub active_scale: f64,
    /// Window of move history used to estimate release velocity.
    pub velocity_window: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            overshoot: 0.1,
            inertia: 0.35,
            rest_speed: 4.0,
            active_scale: 1.15,
            velocity_window: 0.1,
        }
    }
}

impl DragConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.inertia.is_finite() || self.inertia <= 0.0 {
            return Err(EngineError::InvalidHalfLife(self.inertia));
        }
        Ok(())
    }
}

/// Identifies one physical pointer (mouse, touch point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging {
        pointer: PointerId,
        /// Pointer position minus offset at grab time.
        grab: Vec2,
    },
    Settling,
}

#[derive(Debug)]
pub struct DraggableElement {
    pub element: ElementId,
    pub container: ElementId,
    pub offset: Vec2,
    pub velocity: Vec2,
    pub phase: DragPhase,
    pub affordance_visible: bool,
    history: VecDeque<(f64, Vec2)>,
    liveness: Liveness,
    dirty: bool,
}

impl DraggableElement {
    fn scale(&self, config: &DragConfig) -> f64 {
        match self.phase {
            DragPhase::Idle => 1.0,
            DragPhase::Dragging { .. } | DragPhase::Settling => config.active_scale,
        }
    }

    /// Allowed offset range, or `None` when either element is gone.
    fn bounds(&self, geometry: &dyn Geometry) -> Option<OffsetBounds> {
        let layout = geometry.layout_rect(self.element)?;
        let container = geometry.bounding_rect(self.container)?;
        Some(OffsetBounds::keeping_inside(&layout, &container))
    }

    fn release_velocity(&self, now: f64, window: f64) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.history.front(), self.history.back()) else {
            return Vec2::ZERO;
        };
        // Pointer held still before letting go.
        if now - t1 > window || t1 <= t0 {
            return Vec2::ZERO;
        }
        // An anchor older than the window means the pointer rested there
        // until the motion began; the move happened within the window.
        let span = (t1 - t0).min(window);
        (p1 - p0) * (1.0 / span)
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    elements: Vec<(DragId, DraggableElement)>,
    config: DragConfig,
    next_id: usize,
}

impl DragController {
    pub fn new(config: DragConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            elements: Vec::new(),
            config,
            next_id: 0,
        })
    }

    pub fn make_draggable(&mut self, element: ElementId, container: ElementId, liveness: Liveness) -> DragId {
        let id = DragId(self.next_id);
        self.next_id += 1;
        self.elements.push((
            id,
            DraggableElement {
                element,
                container,
                offset: Vec2::ZERO,
                velocity: Vec2::ZERO,
                phase: DragPhase::Idle,
                affordance_visible: false,
                history: VecDeque::new(),
                liveness,
                dirty: false,
            },
        ));
        id
    }

    pub fn get(&self, id: DragId) -> Option<&DraggableElement> {
        self.elements.iter().find(|(i, _)| *i == id).map(|(_, e)| e)
    }

    pub fn is_dragging(&self) -> bool {
        self.elements
            .iter()
            .any(|(_, e)| matches!(e.phase, DragPhase::Dragging { .. }))
    }

    /// Any element still moving or held.
    pub fn is_active(&self) -> bool {
        self.elements.iter().any(|(_, e)| e.phase != DragPhase::Idle)
    }

    pub fn unregister_all(&mut self) {
        self.elements.clear();
    }

    /// Grab the topmost live element under `pos`.  A settling element can be
    /// caught mid-flight.  Returns what was grabbed.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        pos: Vec2,
        now: f64,
        geometry: &dyn Geometry,
    ) -> Option<DragId> {
        let already_holding = self.elements.iter().any(|(_, e)| {
            matches!(e.phase, DragPhase::Dragging { pointer: p, .. } if p == pointer)
        });
        if already_holding {
            return None;
        }

        let (id, el) = self.elements.iter_mut().rev().find(|(_, e)| {
            e.liveness.is_alive()
                && !matches!(e.phase, DragPhase::Dragging { .. })
                && geometry
                    .layout_rect(e.element)
                    .is_some_and(|r| r.translate(e.offset).contains(pos))
        })?;

        el.phase = DragPhase::Dragging {
            pointer,
            grab: pos - el.offset,
        };
        el.velocity = Vec2::ZERO;
        el.affordance_visible = true;
        el.history.clear();
        el.history.push_back((now, el.offset));
        el.dirty = true;
        tracing::debug!(?id, element = ?el.element, "drag started");
        Some(*id)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, pos: Vec2, now: f64, geometry: &dyn Geometry) {
        let overshoot = self.config.overshoot;
        let window = self.config.velocity_window;
        for (_, el) in &mut self.elements {
            let DragPhase::Dragging { pointer: p, grab } = el.phase else {
                continue;
            };
            if p != pointer || !el.liveness.is_alive() {
                continue;
            }
            let Some(bounds) = el.bounds(geometry) else {
                continue;
            };
            el.offset = resist(pos - grab, &bounds, overshoot);
            el.history.push_back((now, el.offset));
            // Keep the newest sample older than the window as the anchor.
            while el.history.get(1).is_some_and(|(t, _)| now - t > window) {
                el.history.pop_front();
            }
            el.dirty = true;
        }
    }

    pub fn pointer_up(&mut self, pointer: PointerId, now: f64) {
        let window = self.config.velocity_window;
        for (id, el) in &mut self.elements {
            if !matches!(el.phase, DragPhase::Dragging { pointer: p, .. } if p == pointer) {
                continue;
            }
            el.velocity = el.release_velocity(now, window);
            el.phase = DragPhase::Settling;
            el.history.clear();
            el.dirty = true;
            tracing::debug!(?id, velocity = ?el.velocity, "drag released");
        }
    }

    /// Advance inertia by `dt` and emit writes for anything that changed.
    pub fn update(&mut self, dt: f64, geometry: &dyn Geometry, batch: &mut WriteBatch) {
        self.elements.retain(|(_, e)| e.liveness.is_alive());
        let config = self.config;
        for (id, el) in &mut self.elements {
            let Some(bounds) = el.bounds(geometry) else {
                tracing::trace!(?id, "draggable or container missing; skipped");
                continue;
            };
            match el.phase {
                DragPhase::Dragging { .. } => {}
                DragPhase::Settling => {
                    settle_step(el, &bounds, dt, &config);
                    el.dirty = true;
                }
                DragPhase::Idle => {
                    // Container may have shrunk since the element came to rest.
                    if !bounds.contains(el.offset) {
                        el.offset = bounds.clamp(el.offset);
                        el.dirty = true;
                    }
                }
            }
            if el.dirty {
                el.dirty = false;
                batch.push(el.element, Write::DragOffset(el.offset));
                batch.push(el.element, Write::Scale(el.scale(&config)));
                batch.push(el.element, Write::Affordance(el.affordance_visible));
            }
        }
    }
}

/// One inertial frame: snap any overshoot back, coast, stop at the edges,
/// decay, and come to rest when slow enough.
fn settle_step(el: &mut DraggableElement, bounds: &OffsetBounds, dt: f64, config: &DragConfig) {
    let dt = dt.max(0.0);
    let moved = bounds.clamp(el.offset) + el.velocity * dt;
    let clamped = bounds.clamp(moved);
    if clamped.x != moved.x {
        el.velocity.x = 0.0;
    }
    if clamped.y != moved.y {
        el.velocity.y = 0.0;
    }
    el.offset = clamped;
    el.velocity = el.velocity * (-dt / config.inertia).exp();

    if el.velocity.length() < config.rest_speed {
        el.velocity = Vec2::ZERO;
        el.phase = DragPhase::Idle;
        el.affordance_visible = false;
        tracing::debug!(element = ?el.element, offset = ?el.offset, "drag settled");
    }
}

/// Clamp `raw` into `bounds`, letting it stretch past an edge by at most
/// `overshoot` of the axis range with exponentially growing resistance.
fn resist(raw: Vec2, bounds: &OffsetBounds, overshoot: f64) -> Vec2 {
    let extent = bounds.extent();
    Vec2::new(
        resist_axis(raw.x, bounds.min.x, bounds.max.x, overshoot * extent.x),
        resist_axis(raw.y, bounds.min.y, bounds.max.y, overshoot * extent.y),
    )
}

fn resist_axis(v: f64, lo: f64, hi: f64, margin: f64) -> f64 {
    let squash = |excess: f64| {
        if margin <= 0.0 {
            0.0
        } else {
            margin * (1.0 - (-excess / margin).exp())
        }
    };
    if v < lo {
        lo - squash(lo - v)
    } else if v > hi {
        hi + squash(v - hi)
    } else {
        v
    }
}
