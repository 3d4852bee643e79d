//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer reads the element table the engine writes into and turns it
//! into cells on the terminal.  It never computes animation state itself.

pub mod intro_widget;
pub mod layout;
pub mod smooth_scroll;
pub mod stage_widget;
pub mod theme;
