//! Application orchestration: state, the event reader, input handling and stage construction.

pub mod event;
pub mod handler;
pub mod stage;
pub mod state;
