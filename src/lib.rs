//! Cycle of Crime: narrative core for a time-loop sting game.
//!
//! Each loop re-skins the city with a twist: new identities for the job
//! giver, informant and target, a dialogue style, and a themed bust. The
//! player takes the job, gathers intel, approaches the target and is
//! arrested every time. This crate owns that loop: the twist catalog,
//! twist-aware dialogue assembly, the dialogue tree engine and the mission
//! state machine. Rendering and input stay outside, behind `Presenter`.

pub mod content;
pub mod core;
pub mod schema;

pub use crate::core::game::{ChoiceOutcome, Game, GameBuilder, GameError, Presenter};
