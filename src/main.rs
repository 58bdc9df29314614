//! Brickfall headless runner
//!
//! Plays the game with the autopilot and logs what happens. Useful for
//! smoke-testing level configs and tuning.
//!
//! Usage: `brickfall [--seed N] [--frames N] [--level N] [config.json]`

use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};

use brickfall::GameConfig;
use brickfall::audio::{AudioManager, LogAudio};
use brickfall::consts::FRAME_DT_MS;
use brickfall::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Ten minutes at 60 fps
const DEFAULT_FRAMES: u64 = 36_000;

struct Options {
    seed: u64,
    frames: u64,
    level: u32,
    config_path: Option<String>,
}

fn parse_args() -> Result<Options, Box<dyn Error>> {
    let mut options = Options {
        seed: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
        frames: DEFAULT_FRAMES,
        level: 1,
        config_path: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = next_value(&mut args, "--seed")?.parse()?,
            "--frames" => options.frames = next_value(&mut args, "--frames")?.parse()?,
            "--level" => options.level = next_value(&mut args, "--level")?.parse()?,
            _ if arg.starts_with("--") => return Err(format!("unknown option {arg}").into()),
            _ => options.config_path = Some(arg),
        }
    }
    Ok(options)
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, Box<dyn Error>> {
    args.next().ok_or_else(|| format!("{flag} needs a value").into())
}

fn log_event(event: &GameEvent, state: &GameState) {
    match event {
        GameEvent::BallLost { lives_left } => log::info!("Ball lost, {} lives left", lives_left),
        GameEvent::LevelCleared { level } => {
            log::info!("Level {} cleared, score {}", level, state.score)
        }
        GameEvent::GameOver(reason) => log::info!("Game over: {:?}", reason),
        other => log::trace!("{:?}", other),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args()?;
    let config = match &options.config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    log::info!("Brickfall starting with seed {}", options.seed);
    let mut state = GameState::new(config, options.seed)?;
    if options.level != 1 {
        state.change_level(options.level)?;
    }

    let mut audio = AudioManager::new(LogAudio);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut frames = 0;
    while frames < options.frames && state.phase != GamePhase::GameOver {
        tick(&mut state, &input, FRAME_DT_MS);
        frames += 1;

        let events = state.drain_events();
        for event in &events {
            log_event(event, &state);
        }
        audio.handle_events(&events);
    }

    log::info!(
        "Stopped after {} frames: level {} (stage {}), score {}, lives {}",
        frames,
        state.level,
        state.stage,
        state.score,
        state.lives
    );
    println!("{}", state.snapshot().to_json()?);
    Ok(())
}
