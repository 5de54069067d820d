//! Headless demo driver: loads a level (built-in board by default), plays
//! a scripted session shot by shot, and prints the outcome.
//!
//! Usage: peg-drop [level.json] [seed]

use std::env;
use std::fs;
use std::process::ExitCode;

use glam::Vec2;

use peg_drop::components::{GameOutcome, GameStatus};
use peg_drop::consts::SIM_DT;
use peg_drop::{GameEngine, LevelSpec};

/// Aim sweep for the scripted session, one x target per shot
const AIM_X: [f32; 10] = [0.3, 0.45, 0.6, 0.7, 0.35, 0.5, 0.65, 0.4, 0.55, 0.25];

/// A shot that has not settled after this much simulated time aborts the run
const SHOT_TIMEOUT: f32 = 30.0;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let level = match args.next() {
        Some(path) => {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(err) => {
                    eprintln!("{path}: {err}");
                    return ExitCode::FAILURE;
                }
            };
            match LevelSpec::from_json(&json) {
                Ok(level) => level,
                Err(err) => {
                    eprintln!("{path}: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => LevelSpec::demo(),
    };
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);

    let mut engine = match GameEngine::new(&level, seed) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("level rejected: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut shots = 0usize;
    loop {
        let target = Vec2::new(AIM_X[shots % AIM_X.len()], 0.9);
        engine.on_drag_move(target);
        engine.advance(SIM_DT);
        engine.on_drag_release(target);
        shots += 1;

        let mut elapsed = 0.0;
        while engine.ball_in_flight() && elapsed < SHOT_TIMEOUT {
            engine.advance(SIM_DT);
            elapsed += SIM_DT;
        }
        if engine.ball_in_flight() {
            log::warn!("shot {shots} never settled, ending session");
            break;
        }

        let state = engine.game_state();
        log::info!(
            "shot {shots}: score {}, {} balls and {} orange pegs left",
            state.score,
            state.balls_remaining,
            state.orange_remaining
        );
        if state.status != GameStatus::Playing || state.balls_remaining == 0 {
            break;
        }
    }

    let state = engine.game_state();
    let outcome = match state.status {
        GameStatus::Playing => "unfinished",
        GameStatus::Ended(GameOutcome::Won) => "won",
        GameStatus::Ended(GameOutcome::Lost) => "lost",
    };
    println!(
        "{}: {outcome} after {shots} shots, final score {} ({} renderables)",
        level.name,
        state.score,
        engine.snapshot().len()
    );
    ExitCode::SUCCESS
}
