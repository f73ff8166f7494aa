use serde::{Deserialize, Serialize};

/// Phases of the game, which act as states in the game's finite-state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Starting hands are dealt, and each player is yet to pick their initial destinations.
    ///
    /// Once all have done so, we move to the turn-based game ([`GamePhase::NormalTurns`]).
    AwaitingInitialDestinations,
    /// The main phase of the game.
    ///
    /// Lasts until a player is left with fewer trains than the rules allow.
    NormalTurns,
    /// A player is low on trains: every player has one turn left.
    EndgameWindow,
    /// No actions can be taken anymore, and scores are final.
    Finished,
}

impl GamePhase {
    /// Whether players are taking turns.
    #[inline]
    pub fn is_turn_based(&self) -> bool {
        matches!(self, GamePhase::NormalTurns | GamePhase::EndgameWindow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_phase_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&GamePhase::AwaitingInitialDestinations)?,
            r#""awaiting_initial_destinations""#
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::NormalTurns)?,
            r#""normal_turns""#
        );
        assert_eq!(serde_json::to_string(&GamePhase::Finished)?, r#""finished""#);
        Ok(())
    }

    #[test]
    fn json_to_game_phase() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<GamePhase>(r#""endgame_window""#)?,
            GamePhase::EndgameWindow
        );
        assert_eq!(
            serde_json::from_str::<GamePhase>(r#""finished""#)?,
            GamePhase::Finished
        );

        Ok(())
    }

    #[test]
    fn invalid_json_to_game_phase() {
        assert!(serde_json::from_str::<GamePhase>(r#""in_lobby""#).is_err());
    }

    #[test]
    fn turn_based_phases() {
        assert!(!GamePhase::AwaitingInitialDestinations.is_turn_based());
        assert!(GamePhase::NormalTurns.is_turn_based());
        assert!(GamePhase::EndgameWindow.is_turn_based());
        assert!(!GamePhase::Finished.is_turn_based());
    }
}
