//! Pool round trips driven by the despawn zone and window turnover

use super::{children_in_window, chunk_children, seeded_config, started};
use crate::ecs::EntityTag;
use crate::events::NullSink;
use crate::foundation::math::Vec3;
use crate::pool::{CHUNK_POOL, PICKUP_POOL};
use crate::track::{TerrainChunk, TrackError, TrackStreamer, WindowState};

fn assert_no_leak(streamer: &TrackStreamer) {
    assert_eq!(streamer.lent_streamed(), children_in_window(streamer).len());
    assert_eq!(streamer.pools().lent(CHUNK_POOL), Some(streamer.manager().len()));
}

#[test]
fn test_zone_exit_recycles_head_without_leaking() {
    let mut streamer = started(seeded_config(0.0, 15.0));
    let first_head = streamer.manager().head().expect("head");
    assert_no_leak(&streamer);

    let mut advances = 0;
    let mut released = 0;
    for _ in 0..200 {
        let report = streamer.tick(0.1, Vec3::zeros(), &mut NullSink).expect("tick");
        advances += report.advances.len();
        released += report.released;
        assert_no_leak(&streamer);
        assert_eq!(streamer.manager().len(), 4);
    }

    // 400 units of travel; the first chunk is fully behind the zone after 152.5
    assert!(advances >= 2);
    assert!(released > 0);
    assert_ne!(streamer.manager().head(), Some(first_head));
}

#[test]
fn test_retired_head_lies_behind_the_zone() {
    let mut streamer = started(seeded_config(0.0, 0.0));
    let (zone_low, _) = streamer.zone().bounds(0.0);

    for _ in 0..200 {
        let report = streamer.tick(0.1, Vec3::zeros(), &mut NullSink).expect("tick");
        for advance in &report.advances {
            let end = streamer
                .world()
                .position(advance.retired)
                .map(|position| position.z + 100.0)
                .expect("position");
            assert!(end < zone_low + 1e-3);
        }
    }
}

#[test]
fn test_exhausted_pickup_pool_skips_without_failing() {
    let mut config = seeded_config(0.0, 0.0);
    config.track.active_chunk_count = 1;
    config.spawner.min_obstacles_per_chunk = 0;
    config.spawner.max_obstacles_per_chunk = 0;
    config.spawner.min_pickups_per_chunk = 5;
    config.spawner.max_pickups_per_chunk = 5;
    config.spawner.max_goals_per_chunk = 0;
    config.pools.pickup_capacity = 2;
    let streamer = started(config);

    let chunk = streamer.manager().head().expect("head");
    let children = chunk_children(streamer.world(), chunk);
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|child| streamer.world().tag(*child) == EntityTag::PICKUP));
    assert_eq!(streamer.pools().available(PICKUP_POOL), Some(0));

    let terrain = streamer.world().get_component::<TerrainChunk>(chunk).expect("chunk");
    assert!(terrain.is_populated());
}

#[test]
fn test_registry_holds_each_entity_once_and_purges_released() {
    let mut streamer = started(seeded_config(0.0, 10.0));
    let children = children_in_window(&streamer);
    assert_eq!(streamer.mover().len(), streamer.manager().len() + children.len());

    let victim = children[0];
    assert!(streamer.release_streamed(victim).expect("release"));
    assert!(!streamer.release_streamed(victim).expect("second release is a no-op"));
    // Purged lazily on the next sweep
    assert!(streamer.mover().contains(victim));

    streamer.tick(0.0, Vec3::zeros(), &mut NullSink).expect("tick");
    assert!(!streamer.mover().contains(victim));
    assert!(!children_in_window(&streamer).contains(&victim));
    assert_eq!(streamer.world().owner(victim), None);
}

#[test]
fn test_advance_on_empty_window_is_an_error() {
    let mut streamer = started(seeded_config(0.0, 0.0));
    streamer.reset().expect("reset");

    assert!(streamer.manager().is_empty());
    assert!(matches!(streamer.advance(), Err(TrackError::AdvanceOnEmptyWindow)));
}

#[test]
fn test_short_chunk_pool_shrinks_the_window() {
    let mut config = seeded_config(0.0, 0.0);
    config.pools.chunk_capacity = 2;
    let mut streamer = started(config);

    assert_eq!(streamer.manager().len(), 2);
    assert_eq!(streamer.manager().state(), WindowState::Filling);

    // Every advance retries the missing slots; the freed chunk refills one
    let report = streamer.advance().expect("advance");
    assert_eq!(report.added, 1);
    assert_eq!(streamer.manager().len(), 2);
}

#[test]
fn test_reset_returns_everything_and_restarts() {
    let mut streamer = started(seeded_config(0.0, 20.0));
    for _ in 0..50 {
        streamer.tick(0.1, Vec3::zeros(), &mut NullSink).expect("tick");
    }

    streamer.reset().expect("reset");
    assert_eq!(streamer.lent_streamed(), 0);
    assert_eq!(streamer.pools().lent(CHUNK_POOL), Some(0));
    assert!(streamer.mover().is_empty());

    streamer.start().expect("restart");
    assert_eq!(streamer.manager().len(), 4);
    let head = streamer.manager().head().expect("head");
    assert_eq!(streamer.world().position(head), Some(Vec3::zeros()));
    assert_no_leak(&streamer);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = seeded_config(0.0, 0.0);
    config.spawner.lanes.clear();
    assert!(matches!(TrackStreamer::new(config), Err(TrackError::Config(_))));
}
