//! Builds the stage: every section of the page as elements, plus the scroll
//! bindings, hover regions and draggables that animate them.
//!
//! All coordinates are terminal cells.  `vw` / `vh` are the viewport width
//! and height, the units the page layout is expressed in.

use crate::config::AppConfig;
use crate::core::engine::Engine;
use crate::core::error::EngineError;
use crate::core::geometry::Rect;
use crate::core::pointer::{HoverRegion, RegionKind};
use crate::core::scope::SectionScope;
use crate::core::scroll::{AnimationBinding, Property};
use crate::core::surface::{Axis, ElementId, ElementState, ElementTable};
use crate::ui::stage_widget::Visual;
use crate::ui::theme::Role;

const NAV_HEIGHT: f64 = 3.0;
const HERO_WORD: &str = "CREATIVE";
const LETTER_W: f64 = 5.0;
const LETTER_H: f64 = 3.0;
const LETTER_GAP: f64 = 1.0;

pub const NAV_LINKS: [&str; 4] = ["HOME", "ABOUT", "PROJECT", "LET'S TALK"];

/// Number, title over two lines, blurb.
const PROJECTS: [(&str, [&str; 2], &str); 3] = [
    (
        "01.",
        ["Fit Feet", "E-Commerce Website"],
        "A complete storefront for a footwear brand: filtering, accounts and a smooth checkout.",
    ),
    (
        "02.",
        ["Thread", "Clone App"],
        "A social feed clone with personalised recommendations based on how people use it.",
    ),
    (
        "03.",
        ["Pick Me", "Live Project"],
        "A streaming platform connecting creators and audiences with live chat and tipping.",
    ),
];

/// Where a nav link scrolls to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavLink {
    pub element: ElementId,
    pub label: &'static str,
    pub target: f64,
}

/// Everything the app needs to know about a built stage.
#[derive(Debug)]
pub struct StageLayout {
    /// Owns every registration made for this stage.  Dropping the layout
    /// tears them all down.
    pub scope: SectionScope,
    pub visuals: Vec<(ElementId, Visual)>,
    pub nav: Vec<NavLink>,
    pub theme_button: ElementId,
    pub letters: Vec<ElementId>,
    pub lets_talk: ElementId,
    /// Document height in rows.
    pub height: f64,
    pub viewport_height: f64,
}

impl StageLayout {
    /// Largest useful scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.height - self.viewport_height).max(0.0)
    }

    pub fn nav_link(&self, element: ElementId) -> Option<&NavLink> {
        self.nav.iter().find(|link| link.element == element)
    }
}

/// Lay the page out for a `width` x `height` viewport.
pub fn build(width: u16, height: u16, config: &AppConfig) -> Result<(ElementTable, Engine, StageLayout), EngineError> {
    let vw = f64::from(width.max(20));
    let vh = f64::from(height.max(10));
    let mut table = ElementTable::new();
    let mut visuals = Vec::new();
    let scope = SectionScope::new("stage");

    // ── nav ─────────────────────────────────────────────────────
    let clock = table.insert(ElementState::new(Rect::new(2.0, 1.0, 5.0, 1.0)));
    visuals.push((clock, Visual::Clock));

    let button_w = 12.0;
    let theme_button = table.insert(ElementState::new(Rect::new(vw - button_w - 2.0, 1.0, button_w, 1.0)));
    visuals.push((theme_button, Visual::ThemeButton));

    let links_left = 10.0;
    let links_right = vw - button_w - 4.0;
    let slot = ((links_right - links_left) / NAV_LINKS.len() as f64).max(1.0);
    let mut nav_ids = Vec::new();
    for (i, label) in NAV_LINKS.iter().enumerate() {
        let x = links_left + i as f64 * slot;
        let id = table.insert(ElementState::new(Rect::new(x, 1.0, label.len() as f64, 1.0)));
        visuals.push((id, Visual::Link(label.to_string())));
        nav_ids.push(id);
    }

    // ── hero ────────────────────────────────────────────────────
    let hero_top = NAV_HEIGHT;
    let hero_h = (vh - NAV_HEIGHT).max(14.0);
    let word_w = HERO_WORD.len() as f64 * (LETTER_W + LETTER_GAP) + LETTER_GAP;
    let container_h = (hero_h - 5.0).max(LETTER_H + 2.0);
    let container = table.insert(ElementState::new(Rect::new(
        2.0,
        hero_top + 1.0,
        (vw - 4.0).max(word_w),
        container_h,
    )));

    let mut letters = Vec::new();
    for (i, ch) in HERO_WORD.chars().enumerate() {
        let x = LETTER_GAP + i as f64 * (LETTER_W + LETTER_GAP);
        let id = table.insert(ElementState::new(Rect::new(x, 1.0, LETTER_W, LETTER_H)).child_of(container));
        visuals.push((id, Visual::Letter(ch)));
        letters.push(id);
    }

    let tagline_top = hero_top + 1.0 + container_h;
    for (i, line) in ["FRONT-END", "DEVELOPER", "& DESIGNER"].iter().enumerate() {
        let rect = Rect::new(4.0, tagline_top + i as f64, line.len() as f64, 1.0);
        text(&mut table, &mut visuals, rect, line, Role::Heading);
    }

    // ── experience: pinned title slides left ────────────────────
    let experience_top = hero_top + hero_h;
    let title_w = vw * 3.0;
    let title = table.insert(ElementState::new(Rect::new(0.0, experience_top + vh / 2.0, title_w, 1.0)));
    visuals.push((title, Visual::Banner("PORTFOLIO".into())));

    // ── profile ─────────────────────────────────────────────────
    // Pinning holds the title for one extra viewport.
    let profile_top = experience_top + vh * 2.0;
    let wrap = (vw - 8.0).clamp(20.0, 72.0) as usize;
    let mut y = profile_top + 2.0;
    for line in [
        "HI, I'M A PASSIONATE DEVELOPER",
        "FOCUSED ON CREATING BEAUTIFUL, FUNCTIONAL,",
        "AND USER-FRIENDLY APPLICATIONS.",
    ] {
        text(&mut table, &mut visuals, Rect::new(4.0, y, line.len() as f64, 1.0), line, Role::Heading);
        y += 1.0;
    }
    y += 1.0;
    for line in wrap_words(
        "I'm a web developer who enjoys building intuitive, engaging digital experiences, \
         and I bring the same care to every project I work on.",
        wrap,
    ) {
        let w = line.len() as f64;
        text(&mut table, &mut visuals, Rect::new(4.0, y, w, 1.0), &line, Role::Muted);
        y += 1.0;
    }
    y += 1.0;
    text(&mut table, &mut visuals, Rect::new(4.0, y, 9.0, 1.0), " Calicut ", Role::Badge);
    let profile_h = (y + 3.0 - profile_top).max(vh);

    // ── projects ────────────────────────────────────────────────
    let projects_top = profile_top + profile_h;
    let mut y = projects_top + 1.0;
    for (number, name, blurb) in PROJECTS {
        text(&mut table, &mut visuals, Rect::new(4.0, y, 3.0, 1.0), number, Role::Number);
        for line in name {
            text(&mut table, &mut visuals, Rect::new(8.0, y, line.len() as f64, 1.0), line, Role::Heading);
            y += 1.0;
        }
        for line in wrap_words(blurb, wrap) {
            let w = line.len() as f64;
            text(&mut table, &mut visuals, Rect::new(8.0, y, w, 1.0), &line, Role::Muted);
            y += 1.0;
        }
        y += 2.0;
    }
    let projects_h = y - projects_top;

    // ── let's talk: arrow zone, upside-down heading drifting right ──
    let lets_talk_top = projects_top + projects_h;
    let lets_talk = table.insert(ElementState::new(Rect::new(0.0, lets_talk_top, vw, vh)));
    let mut heading_state = ElementState::new(Rect::new(-2.0 * vw, vh / 2.0, title_w, 1.0)).child_of(lets_talk);
    heading_state.rotate = 180.0;
    let heading = table.insert(heading_state);
    visuals.push((heading, Visual::Banner("LET'S TALK".into())));

    let arrow = table.insert(
        ElementState::new(Rect::new(0.0, 0.0, 3.0, 1.0))
            .child_of(lets_talk)
            .with_opacity(0.0)
            .with_scale(0.8),
    );
    visuals.push((arrow, Visual::Arrow));

    let cursor = table.insert(ElementState::new(Rect::new(0.0, 0.0, 1.0, 1.0)).fixed());
    visuals.push((cursor, Visual::Cursor));

    let document_h = lets_talk_top + vh;

    // ── engine wiring ───────────────────────────────────────────
    let mut engine = Engine::new(cursor, arrow, config.engine())?;

    engine.scroll.register(
        AnimationBinding::new(
            title,
            Property::Translate(Axis::X),
            (experience_top, experience_top + vh),
            (0.0, -1.35 * title_w),
        )
        .pinned()
        .scrub(config.scrub),
        scope.liveness(),
    )?;
    engine.scroll.register(
        AnimationBinding::new(
            heading,
            Property::Translate(Axis::X),
            (lets_talk_top - 0.1 * vh, lets_talk_top + vh),
            (0.0, 4.5 * vw),
        )
        .scrub(config.scrub),
        scope.liveness(),
    )?;
    // Dim text washes out on a light page, so the banner starts brighter there.
    engine.scroll.register(
        AnimationBinding::new(heading, Property::Opacity, (lets_talk_top - vh, lets_talk_top), (0.3, 1.0))
            .light_values(0.6, 1.0)
            .scrub(config.scrub),
        scope.liveness(),
    )?;

    for element in nav_ids.iter().copied().chain([theme_button]) {
        engine.pointer.register_hover_region(
            HoverRegion {
                element,
                kind: RegionKind::Interactive,
            },
            scope.liveness(),
        );
    }
    engine.pointer.register_hover_region(
        HoverRegion {
            element: lets_talk,
            kind: RegionKind::ArrowZone,
        },
        scope.liveness(),
    );

    for &letter in &letters {
        engine.drag.make_draggable(letter, container, scope.liveness());
    }

    let targets = [0.0, profile_top, projects_top, lets_talk_top];
    let nav = nav_ids
        .iter()
        .zip(NAV_LINKS)
        .zip(targets)
        .map(|((&element, label), target)| NavLink { element, label, target })
        .collect();

    tracing::debug!(width, height, document_h, "stage built");
    Ok((
        table,
        engine,
        StageLayout {
            scope,
            visuals,
            nav,
            theme_button,
            letters,
            lets_talk,
            height: document_h,
            viewport_height: vh,
        },
    ))
}

fn text(table: &mut ElementTable, visuals: &mut Vec<(ElementId, Visual)>, rect: Rect, body: &str, role: Role) -> ElementId {
    let id = table.insert(ElementState::new(rect));
    visuals.push((
        id,
        Visual::Text {
            text: body.to_string(),
            role,
        },
    ));
    id
}

/// Greedy word wrap.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
