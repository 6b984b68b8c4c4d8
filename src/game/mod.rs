//! Simulation core: state, combat, events, alliances and the arena loop.

pub mod abilities;
pub mod actions;
pub mod alliance;
pub mod arena;
pub mod classes;
pub mod combat;
pub mod constants;
pub mod error;
pub mod events;
pub mod notify;
pub mod registry;
pub mod state;
