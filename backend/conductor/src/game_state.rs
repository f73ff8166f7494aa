use crate::deck::CardDealer;
use crate::destination::Destination;
use crate::error::{Error, Result};
use crate::game_phase::GamePhase;
use crate::map::{Map, Ownership};
use crate::player::{PlayerId, PlayerState};

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Final (or current) score of a player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Score {
    pub player: PlayerId,
    /// Sum of the points of every track owned.
    pub track_points: u32,
    /// Lengths of fulfilled destinations, minus lengths of unfulfilled ones.
    pub destination_points: i32,
    pub fulfilled: usize,
    pub unfulfilled: usize,
}

impl Score {
    #[inline]
    pub fn total(&self) -> i32 {
        self.track_points as i32 + self.destination_points
    }
}

/// The player with the highest total, if no other player has the same total.
///
/// # Example
/// ```
/// use conductor::game_state::{winner, Score};
///
/// let score = |player, track_points| Score {
///     player,
///     track_points,
///     destination_points: 0,
///     fulfilled: 0,
///     unfulfilled: 0,
/// };
///
/// assert_eq!(winner(&[score(0, 10), score(1, 12)]), Some(1));
/// assert_eq!(winner(&[score(0, 12), score(1, 12)]), None);
/// ```
pub fn winner(scores: &[Score]) -> Option<PlayerId> {
    let best = scores.iter().map(Score::total).max()?;
    let mut best_scores = scores.iter().filter(|score| score.total() == best);

    match (best_scores.next(), best_scores.next()) {
        (Some(score), None) => Some(score.player),
        _ => None,
    }
}

/// All the state of a game, which is the single source of truth for legality and scoring.
///
/// The map and the rules are not part of it: they never change during a game.
/// This is what gets saved and restored, see [`crate::game::Game::snapshot`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Incremented every time a player finishes their turn.
    /// The player whose turn it is maps to `turn % players.len()`.
    pub turn: usize,
    /// Turn during which a player first went below the minimum number of trains.
    pub endgame_trigger: Option<usize>,
    pub card_dealer: CardDealer,
    pub ownership: Ownership,
    pub players: Vec<PlayerState>,
    /// The game's own random stream, including its current position.
    pub rng: ChaCha8Rng,
}

impl GameState {
    /// The player whose turn it is.
    #[inline]
    pub fn current_player(&self) -> PlayerId {
        self.turn % self.players.len()
    }

    /// Predicate that assesses whether a player has connected both cities of a destination with their own tracks.
    pub fn player_meets_destination(
        &self,
        map: &Map,
        player: PlayerId,
        destination: &Destination,
    ) -> bool {
        map.has_player_fulfilled_destination(&self.ownership, destination.cities, player)
    }

    /// Scores every player, in seat order.
    ///
    /// This only reads the state, so computing it twice on the same state yields the same scores.
    pub fn scores(&self, map: &Map) -> Vec<Score> {
        self.players
            .iter()
            .map(|player| {
                let track_points = self
                    .ownership
                    .tracks_owned_by(player.id())
                    .map(|track| map.track(track).points())
                    .sum();

                let mut score = Score {
                    player: player.id(),
                    track_points,
                    destination_points: 0,
                    fulfilled: 0,
                    unfulfilled: 0,
                };

                for destination in player.destinations() {
                    if self.player_meets_destination(map, player.id(), destination) {
                        score.destination_points += destination.points();
                        score.fulfilled += 1;
                    } else {
                        score.destination_points -= destination.points();
                        score.unfulfilled += 1;
                    }
                }

                score
            })
            .collect()
    }

    /// Verifies that a state, e.g. a restored one, fits the given map and number of players.
    pub fn validate(&self, map: &Map, num_players: usize) -> Result<()> {
        if self.ownership.len() != map.tracks().len() {
            return Err(Error::InvalidSnapshot(format!(
                "{} tracks, while the map has {}",
                self.ownership.len(),
                map.tracks().len()
            )));
        }

        if self.players.len() != num_players {
            return Err(Error::InvalidSnapshot(format!(
                "{} players, while the game has {}",
                self.players.len(),
                num_players
            )));
        }

        for (index, player) in self.players.iter().enumerate() {
            if player.id() != index {
                return Err(Error::InvalidSnapshot(format!(
                    "player {} is seated at {}",
                    player.id(),
                    index
                )));
            }

            for destination in player.destinations() {
                let (start, end) = destination.cities;
                if start.0 >= map.cities().len() || end.0 >= map.cities().len() {
                    return Err(Error::InvalidSnapshot(format!(
                        "player {} has a destination outside of the map",
                        index
                    )));
                }
            }
        }

        Ok(())
    }
}
