//! Core engine: scroll bindings, pointer followers, drag, intro, theme.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Everything runs on the single frame-loop thread; section lifetimes are
//! tracked with [`scope::SectionScope`] rather than shared ownership.

pub mod clock;
pub mod drag;
pub mod easing;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod intro;
pub mod pointer;
pub mod scope;
pub mod scroll;
pub mod surface;
pub mod theme;
pub mod timeline;
