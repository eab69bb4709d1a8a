//! Phonics Runner - headless driver
//!
//! Plays a seeded run with the autopilot, answering every battle itself, and
//! logs a summary. Useful for balance passes on a tuning file:
//!
//! ```text
//! RUST_LOG=info phonics-runner [seed] [max_frames] [tuning.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use phonics_runner::audio::NullSink;
    use phonics_runner::progress::MemoryProgress;
    use phonics_runner::sim::{Outcome, TickInput};
    use phonics_runner::{EndlessRunner, Settings, Tuning};

    env_logger::init();
    log::info!("Phonics Runner (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let max_frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60 * 5);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let mut runner = EndlessRunner::new(
        960.0,
        540.0,
        seed,
        tuning,
        Settings::default(),
        Box::new(MemoryProgress::new()),
        Box::new(NullSink),
    );
    let input = TickInput {
        autopilot: true,
        ..TickInput::default()
    };

    let mut frames = 0u64;
    let mut battles = 0u32;
    while frames < max_frames {
        runner.update(&input);
        frames += 1;
        match runner.outcome() {
            Some(Outcome::Gate) => {
                // Every third battle is missed so assist and failure paths get exercised
                battles += 1;
                runner.resume_from_battle(battles % 3 != 0);
            }
            Some(Outcome::Dead) => break,
            None => {}
        }
    }

    let state = runner.state();
    log::info!(
        "seed {} finished after {} frames: {:.0} m, score {}, max combo {}",
        seed,
        frames,
        runner.distance_m(),
        runner.score(),
        state.combo.max_streak
    );
    println!("{}", serde_json::to_string_pretty(&state.stats).unwrap_or_default());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host embeds the library directly
}
