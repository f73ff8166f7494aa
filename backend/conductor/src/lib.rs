//! Engine of a route-claiming board game: players collect train cards, claim tracks between
//! cities, and score by connecting their destinations.
//!
//! A [`game::Game`] drives the turns, and asks each seat's [`interface::PlayerInterface`] for
//! decisions. The [`ai`] module provides computer players.

pub mod ai;
pub mod card;
pub mod city;
pub mod deck;
pub mod destination;
pub mod error;
pub mod game;
pub mod game_phase;
pub mod game_state;
pub mod interface;
pub mod map;
pub mod player;
pub mod rules;

pub use error::{Error, Result};
