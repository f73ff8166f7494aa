//! The boundary between the game and whoever makes the decisions for a player.
//!
//! The game asks questions through [`PlayerInterface`], handing over a read-only [`GameView`],
//! and gets plain data back. Answers that break the rules never abort a game: they are logged,
//! and the game falls back to the closest legal move.

use crate::card::{Hand, Payment, TrainColor};
use crate::city::{CityId, TrackId};
use crate::destination::Destination;
use crate::game_phase::GamePhase;
use crate::game_state::{GameState, Score};
use crate::map::{Map, Ownership, Route, RouteFilter};
use crate::player::{PlayerId, PlayerState};
use crate::rules::Rules;

use serde::{Deserialize, Serialize};

/// What a player does with their turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Take two train cards, or a single face-up wild card.
    DrawCards,
    /// Get offered new destinations, and keep at least one.
    NewDestinations,
    /// Claim one of the tracks returned by [`GameView::affordable_tracks`].
    ClaimTrack,
}

/// Which affordable track to claim, and optionally how to pay for it.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TrackChoice {
    /// Index in the list of affordable tracks.
    pub index: usize,
    /// Color to pay with. Only gray tracks accept one.
    pub color: Option<TrainColor>,
    /// Exact number of wild cards to spend.
    pub wilds: Option<u32>,
}

impl TrackChoice {
    /// Claims the track at `index`, paying the default way.
    pub fn index(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }
}

/// Read-only view of a game, from the perspective of one player.
#[derive(Clone, Copy)]
pub struct GameView<'a> {
    map: &'a Map,
    rules: &'a Rules,
    state: &'a GameState,
    player: PlayerId,
}

impl<'a> GameView<'a> {
    pub(crate) fn new(
        map: &'a Map,
        rules: &'a Rules,
        state: &'a GameState,
        player: PlayerId,
    ) -> Self {
        Self {
            map,
            rules,
            state,
            player,
        }
    }

    /// The player this view belongs to.
    #[inline]
    pub fn player_id(&self) -> PlayerId {
        self.player
    }

    #[inline]
    pub fn map(&self) -> &'a Map {
        self.map
    }

    #[inline]
    pub fn rules(&self) -> &'a Rules {
        self.rules
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    #[inline]
    pub fn turn(&self) -> usize {
        self.state.turn
    }

    #[inline]
    pub fn num_players(&self) -> usize {
        self.state.players.len()
    }

    #[inline]
    pub fn ownership(&self) -> &'a Ownership {
        &self.state.ownership
    }

    /// State of the player this view belongs to.
    #[inline]
    pub fn player(&self) -> &'a PlayerState {
        &self.state.players[self.player]
    }

    #[inline]
    pub fn hand(&self) -> &'a Hand {
        self.player().hand()
    }

    #[inline]
    pub fn destinations(&self) -> &'a [Destination] {
        self.player().destinations()
    }

    #[inline]
    pub fn trains(&self) -> u32 {
        self.player().trains()
    }

    /// How many trains another player has left. This is public information.
    pub fn trains_of(&self, player: PlayerId) -> Option<u32> {
        self.state.players.get(player).map(PlayerState::trains)
    }

    /// How many train cards another player holds. Which ones is private.
    pub fn cards_of(&self, player: PlayerId) -> Option<u32> {
        self.state
            .players
            .get(player)
            .map(|player| player.hand().total())
    }

    #[inline]
    pub fn face_up(&self) -> &'a [Option<TrainColor>] {
        self.state.card_dealer.face_up()
    }

    /// Whether the face-up card at `index` can be taken on this draw.
    pub fn can_take_face_up(&self, index: usize, is_second_draw: bool) -> bool {
        self.state.card_dealer.can_take_face_up(index, is_second_draw)
    }

    /// Cards left to draw, or `None` if the deck never runs out.
    pub fn deck_remaining(&self) -> Option<usize> {
        self.state.card_dealer.deck().remaining()
    }

    /// Unowned tracks the player has both the cards and the trains to claim, in map order.
    pub fn affordable_tracks(&self) -> Vec<TrackId> {
        let me = self.player();
        self.state
            .ownership
            .unowned_tracks()
            .filter(|track| me.can_claim(self.map.track(*track)))
            .collect()
    }

    /// Shortest route between two cities, see [`Map::shortest_route`].
    pub fn shortest_route(&self, from: CityId, to: CityId, filter: RouteFilter) -> Option<Route> {
        self.map
            .shortest_route(from, to, filter, &self.state.ownership)
    }

    /// Whether the player has already connected both cities of `destination`.
    pub fn meets_destination(&self, destination: &Destination) -> bool {
        self.state
            .player_meets_destination(self.map, self.player, destination)
    }

    /// Destinations the player has not connected yet, in the order they were kept.
    pub fn unmet_destinations(&self) -> impl Iterator<Item = &'a Destination> + '_ {
        self.destinations()
            .iter()
            .filter(move |destination| !self.meets_destination(destination))
    }
}

/// Everything the game needs from a player. Calls are synchronous, and only ever happen on the
/// player's own turn, or while setting the game up.
///
/// Notifications have empty default implementations.
pub trait PlayerInterface {
    /// The game is about to start. Starting hands are already dealt.
    fn starting_game(&mut self, _view: &GameView<'_>) {}

    fn starting_turn(&mut self, _view: &GameView<'_>) {}

    fn choose_action(&mut self, view: &GameView<'_>) -> ActionKind;

    /// Which face-up card to take, or `None` to draw blind.
    ///
    /// Called at most twice per [`ActionKind::DrawCards`]. A face-up wild card cannot be taken on the
    /// second draw; asking for one, or for an empty slot, results in a blind draw.
    fn choose_card(&mut self, view: &GameView<'_>, is_second_draw: bool) -> Option<usize>;

    /// Which of the `offered` destinations to keep, as indices. At least `required` must be kept.
    fn keep_destinations(
        &mut self,
        view: &GameView<'_>,
        offered: &[Destination],
        required: usize,
    ) -> Vec<usize>;

    /// Which of the `affordable` tracks to claim. Never called with an empty list.
    fn choose_track(&mut self, view: &GameView<'_>, affordable: &[TrackId]) -> TrackChoice;

    fn drew_card(&mut self, _view: &GameView<'_>, _card: TrainColor) {}

    fn kept_destinations(&mut self, _view: &GameView<'_>, _kept: &[Destination]) {}

    fn claimed_track(&mut self, _view: &GameView<'_>, _track: TrackId, _payment: &Payment) {}

    fn game_over(&mut self, _view: &GameView<'_>, _scores: &[Score]) {}
}
