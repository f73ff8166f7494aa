//! Plays many independent games in parallel, and gathers statistics per seat.

use conductor::ai::{AiPlayer, Strategy};
use conductor::game::Game;
use conductor::game_state::{winner, Score};
use conductor::interface::PlayerInterface;
use conductor::map::Map;
use conductor::rules::Rules;

use log::{debug, error, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::io::{self, Write};
use std::sync::{mpsc, Arc};
use threadpool::ThreadPool;

/// Final scores of one game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    /// Index of the game in the simulation.
    pub game: u64,
    pub seed: u64,
    pub scores: Vec<Score>,
}

/// How one seat fared over all the games.
#[derive(Clone, Debug, PartialEq)]
pub struct SeatStats {
    pub strategy: Strategy,
    /// Games won outright. Ties are not wins.
    pub wins: u64,
    pub total_points: i64,
}

/// Aggregated results of a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub seats: Vec<SeatStats>,
    /// Games that went all the way to the end.
    pub completed: u64,
    /// Games that ended on an error.
    pub failed: u64,
    /// Completed games without a single winner.
    pub ties: u64,
}

impl Summary {
    pub fn new(strategies: &[Strategy]) -> Self {
        Self {
            seats: strategies
                .iter()
                .map(|strategy| SeatStats {
                    strategy: *strategy,
                    wins: 0,
                    total_points: 0,
                })
                .collect(),
            completed: 0,
            failed: 0,
            ties: 0,
        }
    }

    /// Accounts for the final scores of a completed game.
    pub fn record(&mut self, scores: &[Score]) {
        self.completed += 1;
        for score in scores {
            if let Some(seat) = self.seats.get_mut(score.player) {
                seat.total_points += i64::from(score.total());
            }
        }

        match winner(scores).and_then(|player| self.seats.get_mut(player)) {
            Some(seat) => seat.wins += 1,
            None => self.ties += 1,
        }
    }

    /// Share of the completed games won by `seat`, between 0 and 1.
    pub fn win_rate(&self, seat: usize) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.seats[seat].wins as f64 / self.completed as f64
    }

    pub fn average_points(&self, seat: usize) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.seats[seat].total_points as f64 / self.completed as f64
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} games completed, {} failed, {} without a single winner",
            self.completed, self.failed, self.ties
        )?;
        writeln!(
            f,
            "{:<6}{:<18}{:>8}{:>10}{:>14}{:>12}",
            "seat", "strategy", "wins", "win rate", "total points", "avg points"
        )?;

        for (index, seat) in self.seats.iter().enumerate() {
            writeln!(
                f,
                "{:<6}{:<18}{:>8}{:>9.1}%{:>14}{:>12.2}",
                index,
                seat.strategy.to_string(),
                seat.wins,
                self.win_rate(index) * 100.0,
                seat.total_points,
                self.average_points(index)
            )?;
        }

        Ok(())
    }
}

/// Plays a single game between computer players, all seeded from `seed`.
pub fn play_game(
    map: &Map,
    rules: &Rules,
    strategies: &[Strategy],
    seed: u64,
) -> conductor::Result<Vec<Score>> {
    let mut seeds = ChaCha8Rng::seed_from_u64(seed);
    let interfaces = strategies
        .iter()
        .map(|strategy| {
            Box::new(AiPlayer::new(*strategy, seeds.gen())) as Box<dyn PlayerInterface>
        })
        .collect();

    Game::new(map.clone(), rules.clone(), interfaces, seed)?.run()
}

/// Everything needed to play the same matchup over and over.
pub struct Simulation {
    map: Arc<Map>,
    rules: Arc<Rules>,
    strategies: Arc<Vec<Strategy>>,
}

impl Simulation {
    pub fn new(map: Map, rules: Rules, strategies: Vec<Strategy>) -> Self {
        Self {
            map: Arc::new(map),
            rules: Arc::new(rules),
            strategies: Arc::new(strategies),
        }
    }

    /// Plays `games` games on `threads` threads (one per CPU by default). Game `i` uses the seed `seed + i`.
    ///
    /// Returns the summary, along with the scores of every completed game, in game order.
    pub fn run(
        &self,
        games: u64,
        seed: u64,
        threads: Option<usize>,
    ) -> (Summary, Vec<GameRecord>) {
        let thread_pool = match threads {
            Some(threads) => ThreadPool::new(threads),
            None => ThreadPool::default(),
        };
        info!(
            "playing {} games between {:?} on {} threads",
            games,
            self.strategies,
            thread_pool.max_count()
        );

        let (tx, rx) = mpsc::channel();
        for game in 0..games {
            let map = self.map.clone();
            let rules = self.rules.clone();
            let strategies = self.strategies.clone();
            let tx = tx.clone();

            thread_pool.execute(move || {
                let seed = seed.wrapping_add(game);
                let result = play_game(&map, &rules, &strategies, seed);
                if tx.send((game, seed, result)).is_err() {
                    debug!("game {} finished after results stopped being collected", game);
                }
            });
        }
        // Only the workers hold senders from now on: the loop below ends once every game is over.
        drop(tx);

        let mut summary = Summary::new(&self.strategies);
        let mut records = Vec::with_capacity(games as usize);
        let mut received = 0;
        for (game, seed, result) in rx {
            received += 1;
            match result {
                Ok(scores) => {
                    debug!("game {} (seed {}) is over: {:?}", game, seed, scores);
                    summary.record(&scores);
                    records.push(GameRecord { game, seed, scores });
                }
                Err(e) => {
                    error!("game {} (seed {}) failed: {}", game, seed, e);
                    summary.failed += 1;
                }
            }
        }

        // Games whose worker panicked never reported anything.
        summary.failed += games - received;
        records.sort_by_key(|record| record.game);

        (summary, records)
    }
}

/// Writes one line per game, with the total score of each seat.
///
/// The header names each seat after its strategy, e.g. `game,seed,winner,0:big-track,1:random`.
/// The winner column is empty when the game has no single winner.
pub fn write_csv<W: Write>(
    mut writer: W,
    strategies: &[Strategy],
    records: &[GameRecord],
) -> io::Result<()> {
    write!(writer, "game,seed,winner")?;
    for (seat, strategy) in strategies.iter().enumerate() {
        write!(writer, ",{}:{}", seat, strategy)?;
    }
    writeln!(writer)?;

    for record in records {
        let winning_seat = winner(&record.scores).map_or(String::new(), |seat| seat.to_string());
        write!(writer, "{},{},{}", record.game, record.seed, winning_seat)?;
        for score in &record.scores {
            write!(writer, ",{}", score.total())?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}
