use crate::card::{Hand, Payment, TrainColor};
use crate::city::Track;
use crate::destination::Destination;
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Players are identified by their seat, starting at 0.
pub type PlayerId = usize;

/// Everything the game keeps about a player: their cards, destinations and trains.
///
/// Which tracks they own lives in the [`crate::map::Ownership`] index, and how they make
/// decisions in their [`crate::interface::PlayerInterface`]; neither is part of this state.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerState {
    id: PlayerId,
    /// It is guaranteed that the hand has at all times a count for all train colors.
    hand: Hand,
    /// Destinations the player kept, in the order they were kept.
    destinations: Vec<Destination>,
    /// How many trains the player has left.
    /// This is the currency used, alongside train cards, to claim tracks.
    trains: u32,
}

impl PlayerState {
    /// Creates a player with an empty hand, no destination, and `trains` trains.
    pub fn new(id: PlayerId, trains: u32) -> Self {
        Self {
            id,
            hand: Hand::new(),
            destinations: Vec::new(),
            trains,
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[inline]
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    #[inline]
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    #[inline]
    pub fn trains(&self) -> u32 {
        self.trains
    }

    #[inline]
    pub(crate) fn add_card(&mut self, card: TrainColor) {
        self.hand.add(card);
    }

    pub(crate) fn add_destinations(&mut self, destinations: impl IntoIterator<Item = Destination>) {
        self.destinations.extend(destinations);
    }

    /// Whether the player has both the trains and the cards to claim `track`.
    pub fn can_claim(&self, track: &Track) -> bool {
        track.length() <= self.trains
            && self
                .hand
                .can_afford(track.length(), track.ferries(), track.color())
    }

    /// Pays for `track`: the cards of `payment` leave the hand, and the player lays one train per length unit.
    ///
    /// Returns an `Err`, without mutating anything, if either:
    ///   * There are not enough trains left.
    ///   * The payment does not add up to the track's length.
    ///   * The payment has fewer wild cards than the track has ferries.
    ///   * The payment uses a color the track does not accept.
    ///   * The hand does not hold the cards of the payment.
    pub(crate) fn pay_for_track(&mut self, track: &Track, payment: &Payment) -> Result<()> {
        if track.length() > self.trains {
            return Err(Error::NotEnoughTrains(self.trains, track.length()));
        }

        if payment.total() != track.length() {
            return Err(Error::InvalidPayment(
                track.id(),
                format!("{} for a length of {}", payment, track.length()),
            ));
        }

        if payment.wild < track.ferries() {
            return Err(Error::InvalidPayment(
                track.id(),
                format!("{} for {} ferries", payment, track.ferries()),
            ));
        }

        if let Some(color) = payment.color {
            if color.is_wild() || (!track.is_gray() && color != track.color()) {
                return Err(Error::InvalidPayment(
                    track.id(),
                    format!("{} on a {} track", payment, track.color()),
                ));
            }
        }

        self.hand.spend(payment)?;
        self.trains -= track.length();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::city::{CityId, TrackId};
    use pretty_assertions::assert_eq;

    fn track(length: u32, color: TrainColor, ferries: u32) -> Track {
        Track {
            id: TrackId(3),
            endpoints: (CityId(0), CityId(1)),
            length,
            color,
            tunnel: false,
            ferries,
            points: crate::city::points_for_length(length).unwrap(),
        }
    }

    fn player_with(cards: &[TrainColor], trains: u32) -> PlayerState {
        let mut player = PlayerState::new(1, trains);
        for card in cards {
            player.add_card(*card);
        }
        player
    }

    #[test]
    fn new_player() {
        let player = PlayerState::new(2, 45);
        assert_eq!(player.id(), 2);
        assert_eq!(player.trains(), 45);
        assert_eq!(player.hand().total(), 0);
        assert!(player.destinations().is_empty());
    }

    #[test]
    fn can_claim_needs_trains_and_cards() {
        let player = player_with(&[TrainColor::Red, TrainColor::Red, TrainColor::Wild], 3);
        assert!(player.can_claim(&track(3, TrainColor::Red, 0)));
        assert!(player.can_claim(&track(3, TrainColor::Wild, 1)));
        assert!(!player.can_claim(&track(3, TrainColor::Blue, 0)));
        assert!(!player.can_claim(&track(4, TrainColor::Red, 0)));

        let player = player_with(&[TrainColor::Red, TrainColor::Red, TrainColor::Wild], 2);
        assert!(!player.can_claim(&track(3, TrainColor::Red, 0)));
    }

    #[test]
    fn pay_for_track() {
        let mut player = player_with(
            &[TrainColor::Red, TrainColor::Red, TrainColor::Wild, TrainColor::Blue],
            10,
        );
        let track = track(3, TrainColor::Red, 0);
        let payment = player.hand().payment(3, 0, TrainColor::Red).unwrap();

        player.pay_for_track(&track, &payment).unwrap();
        assert_eq!(player.trains(), 7);
        assert_eq!(player.hand(), &Hand::from_cards([TrainColor::Blue]));
    }

    #[test]
    fn pay_for_track_rejects_invalid_payments() {
        let mut player = player_with(
            &[TrainColor::Red, TrainColor::Red, TrainColor::Wild, TrainColor::Blue],
            10,
        );
        let before = player.clone();

        // Wrong length.
        let payment = Payment {
            color: Some(TrainColor::Red),
            colored: 2,
            wild: 0,
        };
        assert!(matches!(
            player.pay_for_track(&track(3, TrainColor::Red, 0), &payment),
            Err(Error::InvalidPayment(..))
        ));

        // Ferries must be paid with wild cards.
        assert!(matches!(
            player.pay_for_track(&track(2, TrainColor::Wild, 1), &payment),
            Err(Error::InvalidPayment(..))
        ));

        // Wrong color.
        assert!(matches!(
            player.pay_for_track(&track(2, TrainColor::Blue, 0), &payment),
            Err(Error::InvalidPayment(..))
        ));

        // Cards not held.
        let payment = Payment {
            color: Some(TrainColor::Blue),
            colored: 2,
            wild: 0,
        };
        assert!(matches!(
            player.pay_for_track(&track(2, TrainColor::Wild, 0), &payment),
            Err(Error::InsufficientCards(_))
        ));

        assert_eq!(player, before);
    }

    #[test]
    fn pay_for_track_needs_trains() {
        let mut player = player_with(&[TrainColor::Wild; 4], 3);
        let payment = Payment {
            color: None,
            colored: 0,
            wild: 4,
        };
        assert!(matches!(
            player.pay_for_track(&track(4, TrainColor::Wild, 0), &payment),
            Err(Error::NotEnoughTrains(3, 4))
        ));
    }

    #[test]
    fn player_round_trips_through_json() -> serde_json::Result<()> {
        let mut player = player_with(&[TrainColor::Pink, TrainColor::Wild], 12);
        player.add_destinations([Destination {
            cities: (CityId(4), CityId(9)),
            length: 11,
        }]);

        let json = serde_json::to_string(&player)?;
        assert_eq!(serde_json::from_str::<PlayerState>(&json)?, player);
        Ok(())
    }
}
