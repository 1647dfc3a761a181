//! Cube Turning Engine
//!
//! Animates face, inner-layer and wide turns on a 2x2x2 or 4x4x4 cube,
//! keeps the history needed to undo them and provides an interactive 3D
//! viewer. Headless subcommands apply, scramble, export and replay move
//! sequences from the terminal.

mod visualization;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use cuber::config::Config;
use cuber::dispatcher::{Controller, SolveStart};
use cuber::error::CubeError;
use cuber::faces::{format_sequence, parse_sequence};
use cuber::ledger::{now_ms, Source};
use cuber::persistence;

/// Simulated frame length for headless runs.
const FRAME: Duration = Duration::from_millis(16);

/// Turns 2x2x2 and 4x4x4 cubes and visualizes them.
#[derive(Parser)]
#[command(name = "cuber")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cube edge length (2 or 4).
    #[arg(long, default_value_t = 2)]
    size: usize,

    /// TOML file overriding the default timings and tolerances.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible scrambles.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive 3D viewer.
    Play,
    /// Apply a move sequence and print the resulting position index.
    Apply {
        /// Moves such as `R U' Rw r`.
        #[arg(required = true)]
        moves: Vec<String>,
    },
    /// Scramble the cube and print the scramble and the resulting index.
    Scramble,
    /// Apply a move sequence and save the history to disk.
    Export {
        /// Output JSON path; a `.txt` companion is written next to it.
        #[arg(long)]
        out: PathBuf,
        moves: Vec<String>,
    },
    /// Re-apply a saved history to a fresh cube.
    Replay { path: PathBuf },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CubeError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let build = |config| match cli.seed {
        Some(seed) => Controller::with_seed(cli.size, config, seed),
        None => Controller::new(cli.size, config),
    };

    match cli.command {
        Some(Command::Play) | None => {
            let controller = build(config)?;
            println!("Controls: [RLUDFB] turn, [T] reverse, [I]/[W] inner/wide, [Z] undo, [S] scramble, [A] solve");
            visualization::display(controller);
            Ok(())
        }
        Some(Command::Apply { moves }) => run_apply(build(config)?, &moves.join(" ")),
        Some(Command::Scramble) => run_scramble(build(config)?),
        Some(Command::Export { out, moves }) => run_export(build(config)?, &moves.join(" "), &out),
        // the export decides the cube size
        Some(Command::Replay { path }) => run_replay(config, &path),
    }
}

/// Applies user moves headlessly and returns the controller.
fn apply(mut controller: Controller, notation: &str) -> Result<Controller, CubeError> {
    let moves = parse_sequence(notation)?;
    controller.apply_sequence(&moves, Source::User, Instant::now())?;
    Ok(controller)
}

fn print_state(controller: &Controller) {
    print!("{}", controller.cube().format_index());
    println!("Solved: {}", controller.cube().is_solved());
}

fn run_apply(controller: Controller, notation: &str) -> Result<(), CubeError> {
    let controller = apply(controller, notation)?;
    print_state(&controller);
    println!("Moves: {}", controller.move_count());
    println!("Undo: {}", format_sequence(&controller.ledger().undo_sequence()));
    Ok(())
}

fn run_scramble(mut controller: Controller) -> Result<(), CubeError> {
    let start = Instant::now();
    controller.scramble(start);
    let now = controller.run_until_idle(start, FRAME);
    println!("Scramble: {}", format_sequence(controller.ledger().undo_moves()));
    print_state(&controller);

    if controller.auto_solve(now) == SolveStart::AlreadySolved {
        return Ok(());
    }
    controller.run_until_idle(now, FRAME);
    println!("Auto-solved: {}", controller.cube().is_solved());
    Ok(())
}

fn run_export(controller: Controller, notation: &str, out: &Path) -> Result<(), CubeError> {
    let controller = apply(controller, notation)?;
    let export = controller.export(now_ms());
    persistence::save(out, &export)?;
    println!("Wrote {} and {}", out.display(), persistence::text_path(out).display());
    Ok(())
}

fn run_replay(config: Config, path: &Path) -> Result<(), CubeError> {
    let export = persistence::load(path)?;
    let n = export.size;
    println!("Loaded {} moves for a {n}x{n}x{n} cube", export.total_moves);
    let controller = Controller::replay(&export, config, Instant::now())?;
    print_state(&controller);
    println!("Replayed: {}/{}", controller.ledger().history_len(), export.total_moves);
    println!(
        "Index matches export: {}",
        if controller.matches_export(&export) { "yes" } else { "no" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(size: usize) -> Controller {
        Controller::with_seed(size, Config::default(), 1).unwrap()
    }

    #[test]
    fn test_pocket_r_snapshot() {
        let controller = apply(controller(2), "R").unwrap();
        insta::assert_snapshot!(controller.cube().format_index(), @r"
        z=0    z=1
        02 04  03 06
        00 05  01 07
        ");
    }

    #[test]
    fn test_sexy_move_has_order_six() {
        let controller = apply(controller(2), &"R U R' U' ".repeat(6)).unwrap();
        assert!(controller.cube().is_solved());
        assert_eq!(controller.move_count(), 24);
    }

    #[test]
    fn test_apply_rejects_bad_notation() {
        assert!(matches!(
            apply(controller(4), "R Q"),
            Err(CubeError::Notation(_))
        ));
    }

    #[test]
    fn test_replay_reproduces_saved_export() {
        let original = apply(controller(4), "Rw U' f D D").unwrap();
        let path = std::env::temp_dir().join(format!("cuber-{}-main-replay.json", std::process::id()));
        persistence::save(&path, &original.export(0)).unwrap();

        let export = persistence::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(persistence::text_path(&path)).unwrap();

        let replayed = Controller::replay(&export, Config::default(), Instant::now()).unwrap();
        assert!(replayed.matches_export(&export));
        assert_eq!(replayed.cube().index(), original.cube().index());
    }
}
