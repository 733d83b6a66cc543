//! Headless ski runner
//!
//! Drives a game session with a fixed frame clock and a wandering skier,
//! logging what the track and the collaborators see.
//!
//! Usage: `ski_runner [config.toml|config.ron] [frames]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runner_engine::prelude::*;
use runner_engine::events::EffectError;

const DEFAULT_FRAMES: u64 = 60 * 120;
const FRAME_STEP: f32 = 1.0 / 60.0;
const RETARGET_SECONDS: f32 = 1.5;
const STEER_SPEED: f32 = 3.0;

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

/// Running score
#[derive(Default)]
struct Scoreboard {
    score: i32,
}

impl ScoreSink for Scoreboard {
    fn register_points(&mut self, amount: i32) {
        self.score += amount;
        log::info!("+{} points (total {})", amount, self.score);
    }
}

#[derive(Default)]
struct CrashCounter {
    failures: u32,
}

impl FailureSink for CrashCounter {
    fn notify_failure(&mut self) {
        self.failures += 1;
        log::warn!("Crashed! ({} so far)", self.failures);
    }
}

struct EffectLog;

impl EffectSink for EffectLog {
    fn play_effect(&mut self, kind: EffectKind, position: Vec3) -> Result<(), EffectError> {
        log::debug!("Effect {:?} at ({:.1}, {:.1}, {:.1})", kind, position.x, position.y, position.z);
        Ok(())
    }
}

#[derive(Default)]
struct SegmentLog;

impl SegmentListener for SegmentLog {
    fn enter_segment(&mut self, segment: &SegmentInfo) {
        log::info!("Entered chunk {} tilted {:.1} degrees", segment.index, segment.tilt_degrees);
    }
}

/// Skier that drifts toward a randomly chosen lane
struct Skier {
    position: Vec3,
    target_x: f32,
    retarget_in: f32,
    rng: StdRng,
}

impl Skier {
    fn new(seed: u64) -> Self {
        Self {
            position: Vec3::zeros(),
            target_x: 0.0,
            retarget_in: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn steer(&mut self, lanes: &[f32], delta_time: f32) {
        self.retarget_in -= delta_time;
        if self.retarget_in <= 0.0 && !lanes.is_empty() {
            self.target_x = lanes[self.rng.gen_range(0..lanes.len())];
            self.retarget_in = RETARGET_SECONDS;
        }
        let step = STEER_SPEED * delta_time;
        let offset = (self.target_x - self.position.x).clamp(-step, step);
        self.position.x += offset;
    }
}

fn load_config(path: Option<&String>) -> Result<RunnerConfig, AppError> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            Ok(RunnerConfig::load_from_file(path)?)
        }
        None => Ok(RunnerConfig::default()),
    }
}

fn run(config: RunnerConfig, frames: u64) -> Result<(), AppError> {
    let lanes = config.spawner.lanes.clone();
    let mut skier = Skier::new(config.seed.unwrap_or(0));
    let mut session = GameSession::new(config)?;
    let mut scoreboard = Scoreboard::default();
    let mut crashes = CrashCounter::default();
    let mut effects = EffectLog;
    let mut segments = SegmentLog;
    let mut clock = FrameClock::fixed(FRAME_STEP);

    while clock.frame_count() < frames {
        let delta_time = clock.tick();

        if session.phase() == SessionPhase::MainMenu {
            skier = Skier::new(clock.frame_count());
            session.start_game()?;
        }
        if session.phase() == SessionPhase::Active {
            skier.steer(&lanes, delta_time);
        }

        let mut collaborators = Collaborators {
            score: &mut scoreboard,
            failure: &mut crashes,
            effects: &mut effects,
            segments: &mut segments,
        };
        let frame = session.update(delta_time, skier.position, &mut collaborators)?;

        if let Some(tick) = frame.tick {
            if !tick.advances.is_empty() {
                log::debug!(
                    "Frame {}: recycled {} chunk(s), speed {:.1}",
                    clock.frame_count(),
                    tick.advances.len(),
                    tick.speed
                );
            }
        }
    }

    log::info!(
        "Finished after {:.1}s: {} points, {} crash(es)",
        clock.total_time(),
        scoreboard.score,
        crashes.failures
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {panic_info:?}");
        if let Some(location) = panic_info.location() {
            eprintln!("Panic location: {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first())?;
    let frames = match args.get(1) {
        Some(value) => value.parse().map_err(|_| AppError::FrameCount(value.clone()))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Starting ski runner for {} frames", frames);
    if let Err(err) = run(config, frames) {
        log::error!("Application error: {}", err);
        return Err(err.into());
    }
    Ok(())
}
