//! Errors surfaced by the engine.
//!
//! Configuration errors and invariant violations are fatal for the game they happen in.
//! [`Error::OutOfCards`] is the one condition callers may reasonably recover from.

use crate::city::TrackId;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors.
    #[error("unknown color `{0}`")]
    UnknownColor(String),
    #[error("unknown city `{0}`")]
    UnknownCity(String),
    #[error("track between {0} and {1} has length {2}, which has no point value")]
    InvalidTrackLength(String, String, u32),
    #[error("invalid track between {0} and {1}: {2}")]
    InvalidTrack(String, String, String),
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("no destination satisfies the requested bounds after {0} attempts")]
    UnsatisfiableDestination(usize),
    #[error("failed to parse JSON")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse YAML")]
    Yaml(#[from] serde_yaml::Error),

    // Resource exhaustion.
    #[error("there are no cards left to draw")]
    OutOfCards,

    // Invariant violations.
    #[error("track {0} is already owned")]
    TrackAlreadyOwned(TrackId),
    #[error("cannot pick a color for track {0}, which already mandates one")]
    ColorOverrideOnFixedTrack(TrackId),
    #[error("cannot pay with {0}")]
    InsufficientCards(String),
    #[error("cannot lay {1} trains with only {0} left")]
    NotEnoughTrains(u32, u32),
    #[error("invalid payment for track {0}: {1}")]
    InvalidPayment(TrackId, String),
    #[error("player {0} does not exist")]
    UnknownPlayer(usize),
    #[error("game did not finish within {0} turns")]
    TurnLimitExceeded(usize),
    #[error("snapshot does not match the game: {0}")]
    InvalidSnapshot(String),
}
