use crate::destination::DestinationBounds;
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// How train cards are drawn.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckKind {
    /// A finite set of cards, drawn without replacement. Discarded cards are recycled once the pile is empty.
    #[default]
    Finite,
    /// Draws never deplete anything: every draw follows the same distribution.
    Uniform,
}

/// Composition of the train card deck.
///
/// With [`DeckKind::Uniform`], the counts are only used as weights.
///
/// # YAML
/// ```yaml
/// type: finite
/// cards_per_color: 12
/// wilds: 14
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeckRules {
    #[serde(rename = "type")]
    pub kind: DeckKind,
    /// How many cards of each of the 8 non-wild colors.
    pub cards_per_color: u32,
    pub wilds: u32,
}

impl Default for DeckRules {
    fn default() -> Self {
        Self {
            kind: DeckKind::Finite,
            cards_per_color: 12,
            wilds: 14,
        }
    }
}

/// Every tunable of a game. Any key missing from a rules file takes its default value.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Rules {
    /// Train cards dealt to each player before the first turn.
    pub starting_hand_size: usize,
    /// Size of the face-up row.
    pub face_up_cards: usize,
    /// The face-up row is redrawn whenever it shows this many wild cards.
    pub max_wilds_face_up: usize,
    /// Destinations offered when a player asks for new ones during their turn.
    pub destinations_offered: usize,
    /// Destinations offered to each player before the first turn. The first of them is a long one.
    pub initial_destinations_offered: usize,
    /// How many of the initial destinations a player has to keep.
    pub min_initial_destinations_kept: usize,
    /// Minimum length of the long initial destination.
    pub long_destination_min_length: u32,
    /// Bounds every other destination is generated with.
    pub destination_bounds: DestinationBounds,
    pub initial_trains: u32,
    /// The endgame starts once a player has fewer trains than this.
    pub min_trains: u32,
    /// A game taking more rounds than this is considered stuck.
    pub max_rounds: usize,
    pub deck: DeckRules,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_hand_size: 4,
            face_up_cards: 5,
            max_wilds_face_up: 3,
            destinations_offered: 3,
            initial_destinations_offered: 4,
            min_initial_destinations_kept: 2,
            long_destination_min_length: 20,
            destination_bounds: DestinationBounds {
                length_min: Some(5),
                length_max: None,
                hops_min: Some(2),
                hops_max: None,
            },
            initial_trains: 45,
            min_trains: 3,
            max_rounds: 1000,
            deck: DeckRules::default(),
        }
    }
}

impl Rules {
    /// Parses YAML rules, and validates them.
    ///
    /// # Example
    /// ```
    /// use conductor::rules::{DeckKind, Rules};
    ///
    /// let rules = Rules::from_yaml("initial_trains: 30\ndeck:\n  type: uniform\n").unwrap();
    /// assert_eq!(rules.initial_trains, 30);
    /// assert_eq!(rules.deck.kind, DeckKind::Uniform);
    /// assert_eq!(rules.deck.cards_per_color, 12);
    /// assert_eq!(rules.face_up_cards, 5);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let rules: Rules = serde_yaml::from_str(yaml)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parses JSON rules, and validates them.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Rejects rules no game could be played with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidRules(reason.to_owned()));

        if self.face_up_cards == 0 {
            return invalid("the face-up row cannot be empty");
        }
        if self.max_wilds_face_up == 0 {
            return invalid("the wild card limit of the face-up row must be at least 1");
        }
        if self.deck.cards_per_color == 0 && self.deck.wilds == 0 {
            return invalid("the deck has no cards");
        }
        if self.destinations_offered == 0 {
            return invalid("at least one destination must be offered");
        }
        if self.min_initial_destinations_kept > self.initial_destinations_offered {
            return invalid("players cannot keep more initial destinations than offered");
        }
        if self.min_trains > self.initial_trains {
            return invalid("the endgame would start before the first turn");
        }
        if self.max_rounds == 0 {
            return invalid("games need at least one round");
        }
        if let (Some(min), Some(max)) = (
            self.destination_bounds.length_min,
            self.destination_bounds.length_max,
        ) {
            if min > max {
                return invalid("destination length bounds are inverted");
            }
        }
        if let (Some(min), Some(max)) = (
            self.destination_bounds.hops_min,
            self.destination_bounds.hops_max,
        ) {
            if min > max {
                return invalid("destination hop bounds are inverted");
            }
        }

        Ok(())
    }

    /// Bounds of the long initial destination.
    pub fn long_destination_bounds(&self) -> DestinationBounds {
        DestinationBounds {
            length_min: Some(
                self.long_destination_min_length
                    .max(self.destination_bounds.length_min.unwrap_or(0)),
            ),
            length_max: None,
            ..self.destination_bounds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    const RULES: &str = include_str!("../../../data/rules.yaml");

    #[test]
    fn default_rules_are_valid() {
        assert!(Rules::default().validate().is_ok());
    }

    #[test]
    fn rules_file_matches_defaults() {
        assert_eq!(Rules::from_yaml(RULES).unwrap(), Rules::default());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let rules = Rules::from_yaml("face_up_cards: 6").unwrap();
        assert_eq!(
            rules,
            Rules {
                face_up_cards: 6,
                ..Rules::default()
            }
        );

        let rules = Rules::from_json(r#"{"deck": {"wilds": 0}}"#).unwrap();
        assert_eq!(rules.deck.wilds, 0);
        assert_eq!(rules.deck.cards_per_color, 12);
        assert_eq!(rules.deck.kind, DeckKind::Finite);
    }

    #[test]
    fn invalid_rules() {
        let cases = [
            Rules {
                face_up_cards: 0,
                ..Rules::default()
            },
            Rules {
                max_wilds_face_up: 0,
                ..Rules::default()
            },
            Rules {
                deck: DeckRules {
                    kind: DeckKind::Uniform,
                    cards_per_color: 0,
                    wilds: 0,
                },
                ..Rules::default()
            },
            Rules {
                destinations_offered: 0,
                ..Rules::default()
            },
            Rules {
                min_trains: 46,
                ..Rules::default()
            },
            Rules {
                initial_destinations_offered: 1,
                ..Rules::default()
            },
        ];

        for rules in cases {
            assert!(
                matches!(rules.validate(), Err(Error::InvalidRules(_))),
                "{rules:?}"
            );
        }
    }

    #[test]
    fn malformed_yaml() {
        assert!(matches!(
            Rules::from_yaml("deck:\n  type: bottomless\n"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            Rules::from_yaml("face_up_cards: -1"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn long_destination_bounds() {
        let rules = Rules::default();
        let bounds = rules.long_destination_bounds();
        assert_eq!(bounds.length_min, Some(20));
        assert_eq!(bounds.hops_min, Some(2));
    }
}
