//! Integration tests for the game engine, played through the public API only.

use conductor::ai::{AiPlayer, Strategy};
use conductor::city::{CityId, TrackId};
use conductor::destination::Destination;
use conductor::game::Game;
use conductor::game_phase::GamePhase;
use conductor::interface::{ActionKind, GameView, PlayerInterface, TrackChoice};
use conductor::map::Map;
use conductor::rules::Rules;
use conductor::Error;

use pretty_assertions::assert_eq;

const EUROPE: &str = include_str!("../../../data/europe.json");
const RULES: &str = include_str!("../../../data/rules.yaml");

/// Claims the first affordable track whenever it can, and draws blind otherwise.
struct Greedy;

impl PlayerInterface for Greedy {
    fn choose_action(&mut self, view: &GameView<'_>) -> ActionKind {
        if view.affordable_tracks().is_empty() {
            ActionKind::DrawCards
        } else {
            ActionKind::ClaimTrack
        }
    }

    fn choose_card(&mut self, _view: &GameView<'_>, _is_second_draw: bool) -> Option<usize> {
        None
    }

    fn keep_destinations(
        &mut self,
        _view: &GameView<'_>,
        _offered: &[Destination],
        required: usize,
    ) -> Vec<usize> {
        (0..required).collect()
    }

    fn choose_track(&mut self, _view: &GameView<'_>, _affordable: &[TrackId]) -> TrackChoice {
        TrackChoice::index(0)
    }
}

fn ai_players(strategies: &[Strategy], seed: u64) -> Vec<Box<dyn PlayerInterface>> {
    strategies
        .iter()
        .enumerate()
        .map(|(seat, strategy)| {
            Box::new(AiPlayer::new(*strategy, seed + seat as u64)) as Box<dyn PlayerInterface>
        })
        .collect()
}

fn europe() -> Map {
    Map::from_json(EUROPE).unwrap()
}

fn rules() -> Rules {
    Rules::from_yaml(RULES).unwrap()
}

// Tests for a whole game on a tiny map.

#[test]
fn triangle_game() {
    let map = Map::from_json(
        r#"[
            {"endpoints": ["A", "B"], "length": 2, "color": "red"},
            {"endpoints": ["B", "C"], "length": 2, "color": "any"},
            {"endpoints": ["A", "C"], "length": 4, "color": "red"}
        ]"#,
    )
    .unwrap();
    let rules = Rules {
        initial_destinations_offered: 0,
        min_initial_destinations_kept: 0,
        ..Rules::default()
    };
    let (a, b, c) = (
        map.city_id("A").unwrap(),
        map.city_id("B").unwrap(),
        map.city_id("C").unwrap(),
    );
    assert_eq!((a, b, c), (CityId(0), CityId(1), CityId(2)));
    let destination = Destination::new(&map, a, c).unwrap();
    assert_eq!(destination.length, 4);

    let interfaces: Vec<Box<dyn PlayerInterface>> = vec![Box::new(Greedy), Box::new(Greedy)];
    let mut game = Game::new(map, rules, interfaces, 7).unwrap();

    let owns = |game: &Game, player: usize, track: usize| {
        game.state().ownership.owner(TrackId(track)) == Some(player)
    };
    while game.play_turn().unwrap() != GamePhase::Finished {
        for player in 0..2 {
            assert_eq!(
                game.player_meets_destination(player, &destination),
                (owns(&game, player, 0) && owns(&game, player, 1)) || owns(&game, player, 2)
            );
        }
    }

    // Every track is owned, which ends the game.
    assert!(!game.state().ownership.has_unowned_tracks());
    let scores = game.scores();
    let track_points: u32 = scores.iter().map(|score| score.track_points).sum();
    assert_eq!(track_points, 2 + 2 + 7);
    for player in 0..2 {
        let laid: u32 = game
            .state()
            .ownership
            .tracks_owned_by(player)
            .map(|track| game.map().track(track).length())
            .sum();
        assert_eq!(game.player(player).unwrap().trains() + laid, 45);
    }
}

#[test]
fn maps_reject_lengths_without_points() {
    for length in [0, 5, 7, 9] {
        let json = format!(
            r#"[{{"endpoints": ["A", "B"], "length": {}, "color": "blue"}}]"#,
            length
        );
        assert!(
            matches!(Map::from_json(&json), Err(Error::InvalidTrackLength(_, _, l)) if l == length),
            "length {}",
            length
        );
    }
}

// Tests for whole games with computer players.

#[test]
fn europe_games_finish() {
    let strategies = [
        Strategy::RouteFollowing,
        Strategy::BigTrack,
        Strategy::Destination,
        Strategy::Random,
    ];

    for seed in 0..3 {
        let mut game = Game::new(europe(), rules(), ai_players(&strategies, seed), seed).unwrap();
        let scores = game.run().unwrap();

        assert_eq!(game.phase(), GamePhase::Finished);
        assert_eq!(scores.len(), 4);
        // Scoring only reads the state.
        assert_eq!(game.scores(), scores);

        let state = game.state();
        let someone_ran_out = state
            .players
            .iter()
            .any(|player| player.trains() < game.rules().min_trains);
        assert!(someone_ran_out || !state.ownership.has_unowned_tracks());

        for (seat, score) in scores.iter().enumerate() {
            let player = game.player(seat).unwrap();
            assert_eq!(score.player, seat);
            assert!(player.destinations().len() >= 2);
            assert_eq!(
                score.fulfilled + score.unfulfilled,
                player.destinations().len()
            );
        }
    }
}

#[test]
fn europe_games_are_reproducible() {
    let strategies = [Strategy::Random, Strategy::RouteFollowing, Strategy::BigTrack];
    let play = || {
        let mut game = Game::new(europe(), rules(), ai_players(&strategies, 99), 1234).unwrap();
        let scores = game.run().unwrap();
        (scores, game.snapshot().unwrap())
    };

    let (scores, snapshot) = play();
    let (same_scores, same_snapshot) = play();
    assert_eq!(scores, same_scores);
    assert_eq!(snapshot, same_snapshot);
}

#[test]
fn snapshot_then_restore_carries_on_identically() {
    let strategies = [Strategy::RouteFollowing, Strategy::Destination];
    let mut game = Game::new(europe(), rules(), ai_players(&strategies, 5), 5).unwrap();
    for _ in 0..20 {
        game.play_turn().unwrap();
    }

    let snapshot = game.snapshot().unwrap();
    let mut restored =
        Game::restore(europe(), rules(), &snapshot, ai_players(&strategies, 5)).unwrap();
    assert_eq!(restored.state(), game.state());
    assert_eq!(restored.turn(), 20);

    for _ in 0..20 {
        assert_eq!(restored.play_turn().unwrap(), game.play_turn().unwrap());
    }
    assert_eq!(restored.state(), game.state());
    assert_eq!(restored.scores(), game.scores());
}

#[test]
fn unsatisfiable_destinations_are_fatal() {
    let rules = Rules {
        long_destination_min_length: 500,
        ..rules()
    };
    let mut game = Game::new(
        europe(),
        rules,
        ai_players(&[Strategy::RouteFollowing, Strategy::Random], 0),
        0,
    )
    .unwrap();

    assert!(matches!(
        game.run(),
        Err(Error::UnsatisfiableDestination(1000))
    ));
}
