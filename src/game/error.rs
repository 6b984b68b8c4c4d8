//! Domain error taxonomy.
//!
//! Validation errors are returned to the immediate caller and never abort
//! the round loop; structural errors prevent the arena from starting.

use crate::game::state::Class;

/// Validation errors for player-initiated and event-driven actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("No such player in this arena")]
    UnknownPlayer,
    #[error("Invalid item selection")]
    InvalidItem,
    #[error("This item can only be used by the {0:?} class")]
    ClassMismatch(Class),
    #[error("Cannot form an alliance with yourself")]
    SelfAlliance,
    #[error("A member of this pair is already allied")]
    AlreadyAllied,
    #[error("Target is not a living participant")]
    TargetNotLiving,
    #[error("No special ability uses remaining")]
    NoChargesRemaining,
    #[error("Player is not an active participant in this game")]
    InvalidActorState,
    #[error("Player has no alliance to break")]
    NotAllied,
}

/// Structural errors surfaced before any game state is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("At least {minimum} players are required to start (got {actual})")]
    InsufficientPlayers { minimum: usize, actual: usize },
    #[error("Game has already started")]
    AlreadyStarted,
}
