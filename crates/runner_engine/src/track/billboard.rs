//! Camera-facing orientation for streamed entities
//!
//! The camera is fixed while the world slides under it, so the facing angle
//! of every streamed sprite changes each frame and has to be refreshed.

use crate::ecs::{Entity, EntityTag, World};
use crate::foundation::math::{utils, Vec3};

/// Orient one entity so its front faces `viewpoint`
pub fn face_viewpoint(world: &mut World, entity: Entity, viewpoint: Vec3) {
    if let Some(transform) = world.transform_mut(entity) {
        transform.rotation = utils::facing_rotation(transform.position, viewpoint, Vec3::y());
    }
}

/// Re-face every active streamed entity; returns how many were touched
pub fn refresh_billboards(world: &mut World, viewpoint: Vec3) -> usize {
    let streamed: Vec<Entity> = world.active_with_tag(EntityTag::STREAMED).collect();
    for entity in &streamed {
        face_viewpoint(world, *entity, viewpoint);
    }
    streamed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_front_faces_viewpoint() {
        let mut world = World::new();
        let pickup = world.create_entity("HotPickup", EntityTag::PICKUP);
        world.set_active(pickup, true);
        world.translate(pickup, Vec3::new(0.0, 0.0, 10.0));

        assert_eq!(refresh_billboards(&mut world, Vec3::zeros()), 1);

        let transform = world.transform(pickup).expect("transform");
        // Local +Z points away from the viewer
        assert_relative_eq!(transform.rotation * Vec3::z(), Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_inactive_and_terrain_are_skipped() {
        let mut world = World::new();
        let chunk = world.create_entity("Chunk", EntityTag::TERRAIN);
        world.set_active(chunk, true);
        let rock = world.create_entity("Rock", EntityTag::OBSTACLE);
        world.translate(rock, Vec3::new(3.0, 0.0, 0.0));

        assert_eq!(refresh_billboards(&mut world, Vec3::new(0.0, 0.0, -5.0)), 0);
    }
}
