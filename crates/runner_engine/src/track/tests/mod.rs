//! Cross-module streaming scenarios

mod recycling;

use crate::config::RunnerConfig;
use crate::ecs::{Entity, World};
use crate::track::{TerrainChunk, TrackStreamer};

/// Deterministic config with the given tilt range
fn seeded_config(min_tilt: f32, max_tilt: f32) -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.seed = Some(1234);
    config.track.min_tilt_degrees = min_tilt;
    config.track.max_tilt_degrees = max_tilt;
    config
}

fn started(config: RunnerConfig) -> TrackStreamer {
    crate::foundation::logging::init();
    let mut streamer = TrackStreamer::new(config).expect("config should validate");
    streamer.start().expect("window should fill");
    streamer
}

fn children_in_window(streamer: &TrackStreamer) -> Vec<Entity> {
    streamer
        .manager()
        .window()
        .flat_map(|chunk| chunk_children(streamer.world(), chunk))
        .collect()
}

fn chunk_children(world: &World, chunk: Entity) -> Vec<Entity> {
    world
        .get_component::<TerrainChunk>(chunk)
        .map(|terrain| terrain.children().to_vec())
        .unwrap_or_default()
}
