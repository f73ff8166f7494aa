use crate::card::{Payment, TrainColor};
use crate::city::TrackId;
use crate::deck::CardDealer;
use crate::destination::Destination;
use crate::error::{Error, Result};
use crate::game_phase::GamePhase;
use crate::game_state::{GameState, Score};
use crate::interface::{ActionKind, GameView, PlayerInterface, TrackChoice};
use crate::map::{Map, Ownership};
use crate::player::{PlayerId, PlayerState};
use crate::rules::Rules;

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 5;

/// How many times a player is asked to keep destinations before the game picks for them.
const MAX_DESTINATION_PROMPTS: usize = 3;

/// In charge of holding all the state of the game, asking players for their decisions, and applying them.
///
/// This overall acts as a finite-state machine, see [`GamePhase`].
///
/// A game owns its random stream: two games created with the same seed, map, rules and
/// deterministic players play out exactly the same.
pub struct Game {
    map: Map,
    rules: Rules,
    state: GameState,
    /// One per player, in seat order.
    interfaces: Vec<Box<dyn PlayerInterface>>,
}

impl Game {
    /// Creates a new game in the [`GamePhase::AwaitingInitialDestinations`] phase, with starting hands dealt.
    ///
    /// Returns an `Err` if either:
    ///   * The rules are invalid.
    ///   * There are too few or too many players.
    ///   * The deck cannot cover the starting hands.
    pub fn new(
        map: Map,
        rules: Rules,
        interfaces: Vec<Box<dyn PlayerInterface>>,
        seed: u64,
    ) -> Result<Self> {
        rules.validate()?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&interfaces.len()) {
            return Err(Error::InvalidRules(format!(
                "games have between {} and {} players, not {}",
                MIN_PLAYERS,
                MAX_PLAYERS,
                interfaces.len()
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut card_dealer = CardDealer::new(
            &rules.deck,
            rules.face_up_cards,
            rules.max_wilds_face_up,
            &mut rng,
        );

        let mut players = Vec::with_capacity(interfaces.len());
        for id in 0..interfaces.len() {
            let mut player = PlayerState::new(id, rules.initial_trains);
            for _ in 0..rules.starting_hand_size {
                player.add_card(card_dealer.draw_blind(&mut rng)?);
            }
            players.push(player);
        }

        let state = GameState {
            phase: GamePhase::AwaitingInitialDestinations,
            turn: 0,
            endgame_trigger: None,
            card_dealer,
            ownership: Ownership::new(&map),
            players,
            rng,
        };

        Ok(Self {
            map,
            rules,
            state,
            interfaces,
        })
    }

    /// Rebuilds a game out of a snapshot taken with [`Game::snapshot`].
    ///
    /// The map and rules must be the ones the snapshot was taken with, and there must be one interface per player.
    pub fn restore(
        map: Map,
        rules: Rules,
        snapshot: &str,
        interfaces: Vec<Box<dyn PlayerInterface>>,
    ) -> Result<Self> {
        rules.validate()?;
        let state: GameState = serde_json::from_str(snapshot)?;
        state.validate(&map, interfaces.len())?;

        Ok(Self {
            map,
            rules,
            state,
            interfaces,
        })
    }

    /// Serializes the whole state of the game, random stream included.
    pub fn snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    #[inline]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
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

    /// Returns an `Err` if there is no such player.
    pub fn player(&self, player: PlayerId) -> Result<&PlayerState> {
        self.state
            .players
            .get(player)
            .ok_or(Error::UnknownPlayer(player))
    }

    /// Whether a player has connected both cities of `destination` with their own tracks.
    pub fn player_meets_destination(&self, player: PlayerId, destination: &Destination) -> bool {
        self.state
            .player_meets_destination(&self.map, player, destination)
    }

    /// Scores of every player, in seat order. Only final once the game is [`GamePhase::Finished`].
    pub fn scores(&self) -> Vec<Score> {
        self.state.scores(&self.map)
    }

    /// Total number of turns after which a game is considered stuck.
    #[inline]
    fn turn_limit(&self) -> usize {
        self.rules.max_rounds * self.num_players()
    }

    /// Plays the game until the end, and returns the final scores.
    ///
    /// Returns an `Err` on configuration errors (e.g. destinations that cannot be generated), on
    /// invariant violations, or if the game does not finish within the turn limit.
    pub fn run(&mut self) -> Result<Vec<Score>> {
        info!(
            "starting a game with {} players on a map of {} cities",
            self.num_players(),
            self.map.cities().len()
        );

        while self.play_turn()? != GamePhase::Finished {}

        let scores = self.scores();
        for (player, interface) in self.interfaces.iter_mut().enumerate() {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            interface.game_over(&view, &scores);
        }

        info!(
            "game over after {} turns, scores: {:?}",
            self.state.turn,
            scores.iter().map(Score::total).collect::<Vec<_>>()
        );

        Ok(scores)
    }

    /// Plays a single turn, and returns the phase the game is in afterwards.
    ///
    /// The first call also lets every player pick their initial destinations.
    /// Once the game is [`GamePhase::Finished`], this does nothing.
    pub fn play_turn(&mut self) -> Result<GamePhase> {
        match self.state.phase {
            GamePhase::AwaitingInitialDestinations => self.start()?,
            GamePhase::Finished => return Ok(GamePhase::Finished),
            GamePhase::NormalTurns | GamePhase::EndgameWindow => {}
        }

        if self.state.turn >= self.turn_limit() {
            return Err(Error::TurnLimitExceeded(self.turn_limit()));
        }

        let player = self.state.current_player();
        let action = {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            let interface = &mut self.interfaces[player];
            interface.starting_turn(&view);
            interface.choose_action(&view)
        };

        debug!("turn {}: player {} chose to {:?}", self.state.turn, player, action);

        match action {
            ActionKind::DrawCards => self.draw_cards(player)?,
            ActionKind::NewDestinations => self.new_destinations(player)?,
            ActionKind::ClaimTrack => self.claim_track(player)?,
        }

        self.end_turn(player);
        Ok(self.state.phase)
    }

    /// Deals initial destinations, and moves on to [`GamePhase::NormalTurns`].
    fn start(&mut self) -> Result<()> {
        for (player, interface) in self.interfaces.iter_mut().enumerate() {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            interface.starting_game(&view);
        }

        for player in 0..self.num_players() {
            let num_offered = self.rules.initial_destinations_offered;
            let mut offered = Vec::with_capacity(num_offered);
            for index in 0..num_offered {
                let bounds = if index == 0 {
                    self.rules.long_destination_bounds()
                } else {
                    self.rules.destination_bounds
                };
                offered.push(self.map.generate_destination(&bounds, &mut self.state.rng)?);
            }

            let required = self.rules.min_initial_destinations_kept;
            self.offer_destinations(player, offered, required);
        }

        self.state.phase = GamePhase::NormalTurns;
        debug!("all players picked their initial destinations");
        Ok(())
    }

    /// Moves the turn forward, and makes the game progress towards its end.
    fn end_turn(&mut self, player: PlayerId) {
        let played = self.state.turn;
        self.state.turn += 1;

        if self.state.endgame_trigger.is_none()
            && self.state.players[player].trains() < self.rules.min_trains
        {
            info!(
                "player {} has {} trains left on turn {}, every player has one turn left",
                player,
                self.state.players[player].trains(),
                played
            );
            self.state.endgame_trigger = Some(played);
            self.state.phase = GamePhase::EndgameWindow;
        }

        if let Some(trigger) = self.state.endgame_trigger {
            if self.state.turn > trigger + self.num_players() {
                self.state.phase = GamePhase::Finished;
            }
        }

        if !self.state.ownership.has_unowned_tracks() {
            debug!("every track is owned");
            self.state.phase = GamePhase::Finished;
        }
    }

    /// Offers destinations to a player, and adds the ones they keep to their list.
    ///
    /// Invalid selections are asked again a few times. After that, the first `required` destinations are kept.
    fn offer_destinations(&mut self, player: PlayerId, offered: Vec<Destination>, required: usize) {
        if offered.is_empty() {
            return;
        }
        let required = required.clamp(1, offered.len());

        let mut kept = None;
        for attempt in 0..MAX_DESTINATION_PROMPTS {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            let mut selection =
                self.interfaces[player].keep_destinations(&view, &offered, required);
            selection.sort_unstable();
            selection.dedup();
            selection.retain(|index| *index < offered.len());

            if selection.len() >= required {
                kept = Some(selection);
                break;
            }

            warn!(
                "player {} kept {} of {} destinations, while at least {} are required (attempt {})",
                player,
                selection.len(),
                offered.len(),
                required,
                attempt + 1
            );
        }

        let kept: Vec<Destination> = match kept {
            Some(selection) => selection.into_iter().map(|index| offered[index]).collect(),
            None => {
                warn!(
                    "player {} keeps the first {} destinations offered",
                    player, required
                );
                offered.into_iter().take(required).collect()
            }
        };

        for destination in &kept {
            debug!(
                "player {} keeps destination {}",
                player,
                destination.describe(&self.map)
            );
        }

        self.state.players[player].add_destinations(kept.iter().copied());
        let view = GameView::new(&self.map, &self.rules, &self.state, player);
        self.interfaces[player].kept_destinations(&view, &kept);
    }

    fn new_destinations(&mut self, player: PlayerId) -> Result<()> {
        let mut offered = Vec::with_capacity(self.rules.destinations_offered);
        for _ in 0..self.rules.destinations_offered {
            offered.push(
                self.map
                    .generate_destination(&self.rules.destination_bounds, &mut self.state.rng)?,
            );
        }

        self.offer_destinations(player, offered, 1);
        Ok(())
    }

    /// Draws up to two train cards for the player.
    ///
    /// The turn's draw is over after a single card if it was a face-up wild card, or if
    /// nothing could be drawn a second time.
    fn draw_cards(&mut self, player: PlayerId) -> Result<()> {
        if !self.state.card_dealer.can_draw() {
            debug!("player {} has nothing left to draw", player);
            return Ok(());
        }

        match self.draw_card(player, false)? {
            Some((card, true)) if card.is_wild() => return Ok(()),
            Some(_) => {}
            None => return Ok(()),
        }

        if self.state.card_dealer.can_draw_again() {
            self.draw_card(player, true)?;
        }

        Ok(())
    }

    /// Draws a single train card, face-up or blind depending on the player's choice.
    ///
    /// Returns the card along with whether it was taken face-up, or `None` if nothing could be drawn.
    fn draw_card(
        &mut self,
        player: PlayerId,
        is_second_draw: bool,
    ) -> Result<Option<(TrainColor, bool)>> {
        let choice = {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            self.interfaces[player].choose_card(&view, is_second_draw)
        };

        let card_dealer = &mut self.state.card_dealer;
        let rng = &mut self.state.rng;

        let mut drawn = None;
        if let Some(index) = choice {
            match card_dealer.draw_face_up(index, is_second_draw, rng) {
                Some((card, reshuffled)) => {
                    trace!(
                        "player {} took a face-up {} card{}",
                        player,
                        card,
                        if reshuffled {
                            ", and the face-up cards were redrawn"
                        } else {
                            ""
                        }
                    );
                    drawn = Some((card, true));
                }
                None => warn!(
                    "player {} cannot take face-up card {} (second draw: {}), drawing blind",
                    player, index, is_second_draw
                ),
            }
        }

        if drawn.is_none() {
            drawn = match card_dealer.draw_blind(rng) {
                Ok(card) => {
                    trace!("player {} drew a {} card blind", player, card);
                    Some((card, false))
                }
                // The deck is empty, but there may still be a face-up card to take.
                Err(Error::OutOfCards) => {
                    let index = (0..card_dealer.face_up().len())
                        .find(|index| card_dealer.can_take_face_up(*index, is_second_draw));
                    index
                        .and_then(|index| card_dealer.draw_face_up(index, is_second_draw, rng))
                        .map(|(card, _)| (card, true))
                }
                Err(e) => return Err(e),
            };
        }

        if let Some((card, _)) = drawn {
            self.state.players[player].add_card(card);
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            self.interfaces[player].drew_card(&view, card);
        }

        Ok(drawn)
    }

    /// Asks the player which affordable track to claim, and claims it.
    ///
    /// Falls back to drawing cards if nothing is affordable, or if the player picks a track out of range.
    fn claim_track(&mut self, player: PlayerId) -> Result<()> {
        let (affordable, choice) = {
            let view = GameView::new(&self.map, &self.rules, &self.state, player);
            let affordable = view.affordable_tracks();
            if affordable.is_empty() {
                debug!("player {} cannot afford any track, drawing cards instead", player);
                return self.draw_cards(player);
            }

            let choice = self.interfaces[player].choose_track(&view, &affordable);
            (affordable, choice)
        };

        let track_id = match affordable.get(choice.index) {
            Some(track_id) => *track_id,
            None => {
                warn!(
                    "player {} picked track {} out of {} affordable, drawing cards instead",
                    player,
                    choice.index,
                    affordable.len()
                );
                return self.draw_cards(player);
            }
        };

        let payment = self.payment_for(player, track_id, choice)?;
        let track = self.map.track(track_id);

        self.state.players[player].pay_for_track(track, &payment)?;
        self.state.ownership.claim(track_id, player)?;
        self.state.card_dealer.discard(payment.cards());

        debug!(
            "player {} claimed {} ({} points) using {}",
            player,
            self.map.describe_track(track_id),
            track.points(),
            payment
        );

        let view = GameView::new(&self.map, &self.rules, &self.state, player);
        self.interfaces[player].claimed_track(&view, track_id, &payment);

        Ok(())
    }

    /// Works out how the player pays for a track, honoring their color and wild card choices if possible.
    fn payment_for(
        &self,
        player: PlayerId,
        track_id: TrackId,
        choice: TrackChoice,
    ) -> Result<Payment> {
        let track = self.map.track(track_id);
        let hand = self.state.players[player].hand();

        if choice.color.is_some() && !track.is_gray() {
            return Err(Error::ColorOverrideOnFixedTrack(track_id));
        }

        let default_color = if track.is_gray() {
            hand.most_held_color().unwrap_or(TrainColor::Wild)
        } else {
            track.color()
        };
        let color = choice.color.unwrap_or(default_color);

        let payment = match choice.wilds {
            Some(wild) => hand.payment_with_wilds(track.length(), track.ferries(), color, wild),
            None => hand.payment(track.length(), track.ferries(), color),
        };

        match payment {
            Some(payment) => Ok(payment),
            None => {
                warn!(
                    "player {} cannot pay for {} with {:?}, paying the default way",
                    player,
                    self.map.describe_track(track_id),
                    choice
                );
                hand.default_payment(track.length(), track.ferries(), track.color())
                    .ok_or_else(|| {
                        Error::InsufficientCards(self.map.describe_track(track_id))
                    })
            }
        }
    }
}
