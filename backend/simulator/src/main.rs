// Plays many games between computer players, and reports how each strategy fared.

mod simulation;

use anyhow::{ensure, Context, Result};
use clap::{ArgAction, Parser};
use conductor::ai::Strategy;
use conductor::game::{MAX_PLAYERS, MIN_PLAYERS};
use conductor::map::Map;
use conductor::rules::Rules;
use log::{info, LevelFilter};
use simulation::{write_csv, Simulation};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

/// Plays games between computer players, and prints statistics per seat.
#[derive(Debug, Parser)]
#[command(name = "conductor-sim", version)]
struct Args {
    /// Map file: a JSON array of tracks.
    #[arg(long, default_value = "data/europe.json")]
    map: PathBuf,

    /// Rules file, in YAML. Missing keys take their default value.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Number of games to play.
    #[arg(short, long, default_value_t = 100)]
    games: u64,

    /// Seed of the first game; the following games use the next seeds.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (default: one per CPU).
    #[arg(short, long)]
    threads: Option<usize>,

    /// Writes the scores of every game to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Logs more; can be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Strategy of each seat, in seat order.
    #[arg(
        short = 'p',
        long = "player",
        default_values_t = [Strategy::RouteFollowing, Strategy::BigTrack]
    )]
    players: Vec<Strategy>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG still has the final say.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    ensure!(
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&args.players.len()),
        "games have between {} and {} players, not {}",
        MIN_PLAYERS,
        MAX_PLAYERS,
        args.players.len()
    );
    ensure!(args.threads != Some(0), "at least one thread is needed");

    let map_json = fs::read_to_string(&args.map)
        .with_context(|| format!("cannot read map {}", args.map.display()))?;
    let map = Map::from_json(&map_json)
        .with_context(|| format!("invalid map {}", args.map.display()))?;

    let rules = match &args.rules {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("cannot read rules {}", path.display()))?;
            Rules::from_yaml(&yaml).with_context(|| format!("invalid rules {}", path.display()))?
        }
        None => Rules::default(),
    };
    info!(
        "loaded a map of {} cities and {} tracks",
        map.cities().len(),
        map.tracks().len()
    );

    let simulation = Simulation::new(map, rules, args.players.clone());
    let (summary, records) = simulation.run(args.games, args.seed, args.threads);
    print!("{}", summary);

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        write_csv(BufWriter::new(file), &args.players, &records)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("wrote {} games to {}", records.len(), path.display());
    }

    Ok(())
}
