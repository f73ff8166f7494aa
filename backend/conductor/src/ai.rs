//! Built-in computer players.

use crate::card::TrainColor;
use crate::city::TrackId;
use crate::destination::Destination;
use crate::interface::{ActionKind, GameView, PlayerInterface, TrackChoice};
use crate::map::RouteFilter;

use log::{debug, trace};
use parse_display::{Display, FromStr};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum_macros::EnumIter;

/// How a computer player makes its decisions.
///
/// Strategies are named in kebab-case, e.g. on the command line.
///
/// # Example
/// ```
/// use conductor::ai::Strategy;
///
/// assert_eq!("big-track".parse::<Strategy>().unwrap(), Strategy::BigTrack);
/// assert_eq!(Strategy::RouteFollowing.to_string(), "route-following");
/// ```
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, FromStr, Hash, PartialEq)]
#[display(style = "kebab-case")]
pub enum Strategy {
    /// Works on its first unmet destination, claiming the tracks of the shortest available route
    /// between its cities, or drawing the cards they need.
    RouteFollowing,
    /// Goes for the longest unowned track it has the trains for.
    BigTrack,
    /// Same as [`Strategy::RouteFollowing`], but starts with the longest destinations offered.
    Destination,
    /// Claims a random affordable track one turn out of three, and draws random cards otherwise.
    Random,
}

/// A computer player, following one [`Strategy`].
///
/// The player has its own random stream, so that games stay reproducible.
pub struct AiPlayer {
    strategy: Strategy,
    rng: ChaCha8Rng,
    /// Track the player is working towards this turn, either claiming it or drawing for it.
    target: Option<TrackId>,
}

impl AiPlayer {
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
            target: None,
        }
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Plans the turn by following the route of the first unmet destination.
    fn follow_route(&mut self, view: &GameView<'_>) -> ActionKind {
        let destination = match view.unmet_destinations().next() {
            Some(destination) => *destination,
            None => {
                debug!(
                    "player {} met all their destinations, asking for more",
                    view.player_id()
                );
                return ActionKind::NewDestinations;
            }
        };

        let (start, end) = destination.cities;
        let map = view.map();
        let filter = RouteFilter::Available(view.player_id());
        if let Some(route) = view.shortest_route(start, end, filter) {
            trace!(
                "player {} follows {:?} towards {}",
                view.player_id(),
                route.cities,
                destination.describe(map)
            );

            for cities in route.cities.windows(2) {
                let unowned = map
                    .tracks_between(cities[0], cities[1])
                    .into_iter()
                    .find(|track| view.ownership().owner(*track).is_none());

                if let Some(track) = unowned {
                    self.target = Some(track);
                    return if view.player().can_claim(map.track(track)) {
                        ActionKind::ClaimTrack
                    } else {
                        ActionKind::DrawCards
                    };
                }
            }
        }

        // The route is blocked, or already complete: claim anything.
        if view.affordable_tracks().is_empty() {
            ActionKind::DrawCards
        } else {
            ActionKind::ClaimTrack
        }
    }

    /// Plans the turn around the longest track the player still has the trains for.
    fn go_big(&mut self, view: &GameView<'_>) -> ActionKind {
        let map = view.map();
        let longest = view
            .ownership()
            .unowned_tracks()
            .filter(|track| map.track(*track).length() <= view.trains())
            .fold(None, |longest: Option<TrackId>, track| match longest {
                Some(longest) if map.track(longest).length() >= map.track(track).length() => {
                    Some(longest)
                }
                _ => Some(track),
            });

        self.target = longest;
        match longest {
            Some(track) if view.player().can_claim(map.track(track)) => ActionKind::ClaimTrack,
            _ => ActionKind::DrawCards,
        }
    }

    fn play_randomly(&mut self, view: &GameView<'_>) -> ActionKind {
        if !view.affordable_tracks().is_empty() && self.rng.gen_range(0..3) == 0 {
            ActionKind::ClaimTrack
        } else {
            ActionKind::DrawCards
        }
    }

    /// Face-up card matching the color of the target track, if any.
    fn card_for_target(&self, view: &GameView<'_>, is_second_draw: bool) -> Option<usize> {
        let track = view.map().track(self.target?);
        let color = if track.is_gray() {
            view.hand().most_held_color()?
        } else {
            track.color()
        };

        (0..view.face_up().len()).find(|index| {
            view.face_up()[*index] == Some(color) && view.can_take_face_up(*index, is_second_draw)
        })
    }
}

impl PlayerInterface for AiPlayer {
    fn starting_turn(&mut self, view: &GameView<'_>) {
        self.target = None;
        trace!(
            "player {} ({}) starts turn {} with {:?} and {} trains",
            view.player_id(),
            self.strategy,
            view.turn(),
            view.hand(),
            view.trains()
        );
    }

    fn choose_action(&mut self, view: &GameView<'_>) -> ActionKind {
        match self.strategy {
            Strategy::RouteFollowing | Strategy::Destination => self.follow_route(view),
            Strategy::BigTrack => self.go_big(view),
            Strategy::Random => self.play_randomly(view),
        }
    }

    fn choose_card(&mut self, view: &GameView<'_>, is_second_draw: bool) -> Option<usize> {
        match self.strategy {
            Strategy::Random => {
                // Both piles count as options, like the face-up cards.
                let choice = self.rng.gen_range(0..view.face_up().len() + 2);
                (choice < view.face_up().len()).then_some(choice)
            }
            _ => self.card_for_target(view, is_second_draw),
        }
    }

    fn keep_destinations(
        &mut self,
        _view: &GameView<'_>,
        offered: &[Destination],
        required: usize,
    ) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..offered.len()).collect();
        match self.strategy {
            Strategy::Random => {
                return indices
                    .choose_multiple(&mut self.rng, required)
                    .copied()
                    .collect();
            }
            Strategy::Destination => {
                indices.sort_by_key(|index| std::cmp::Reverse(offered[*index].length))
            }
            Strategy::RouteFollowing | Strategy::BigTrack => {
                indices.sort_by_key(|index| offered[*index].length)
            }
        }

        indices.truncate(required);
        indices
    }

    fn choose_track(&mut self, _view: &GameView<'_>, affordable: &[TrackId]) -> TrackChoice {
        let index = match self.target.and_then(|target| {
            affordable.iter().position(|track| *track == target)
        }) {
            Some(index) => index,
            None if self.strategy == Strategy::Random => self.rng.gen_range(0..affordable.len()),
            None => 0,
        };

        TrackChoice::index(index)
    }

    fn drew_card(&mut self, view: &GameView<'_>, card: TrainColor) {
        trace!("player {} drew a {} card", view.player_id(), card);
    }

    fn kept_destinations(&mut self, view: &GameView<'_>, kept: &[Destination]) {
        for destination in kept {
            trace!(
                "player {} ({}) keeps {}",
                view.player_id(),
                self.strategy,
                destination.describe(view.map())
            );
        }
    }
}
