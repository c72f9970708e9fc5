//! Fliplight headless level runner
//!
//! Loads a legacy text level, runs the simulation to completion (or a tick
//! cap) and prints a JSON summary of the run. This is the external driver
//! of the simulation core; it owns the step cadence, nothing more.

use std::fs;
use std::process::ExitCode;

use fliplight::sim::Board;

/// A stuck layout (e.g. a photon bouncing between mirrors forever) must
/// not hang the runner.
const TICK_CAP: i32 = 10_000;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: fliplight <level.txt> [seed]");
        return ExitCode::FAILURE;
    };
    let seed: u64 = match args.next().map(|s| s.parse()).transpose() {
        Ok(seed) => seed.unwrap_or(42),
        Err(_) => {
            eprintln!("usage: fliplight <level.txt> [seed]");
            return ExitCode::FAILURE;
        }
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("cannot read {path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut board = match Board::from_text(&text) {
        Ok(board) => board,
        Err(e) => {
            log::error!("cannot load {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(dialog) = board.before_dialog() {
        println!("{dialog}");
    }

    board.start(seed);
    while !board.is_complete() && board.current_time() < TICK_CAP {
        board.step();
        log::debug!("tick {}\n{board}", board.current_time());
    }

    let complete = board.is_complete();
    let win = complete && board.is_output_match();
    let summary = serde_json::json!({
        "level": path,
        "seed": seed,
        "ticks": board.current_time(),
        "inputs": board.inputs(),
        "golden": board.golden(),
        "outputs": board.outputs(),
        "complete": complete,
        "win": win,
    });
    println!("{summary}");

    if win {
        if let Some(dialog) = board.after_dialog() {
            println!("{dialog}");
        }
    }
    ExitCode::SUCCESS
}
