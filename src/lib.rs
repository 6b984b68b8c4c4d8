//! Survival Royale Server Library
//!
//! A turn-based last-survivor elimination game engine. Players pick a
//! class, receive starter gear, and advance through timed rounds of
//! weighted-random events, combat, alliances and betrayals until at most
//! one survivor remains.
//!
//! The engine is host-agnostic: it reports everything through a
//! notification channel and accepts player actions through the
//! [`game::actions::ActionGateway`].

pub mod config;
pub mod game;
