//! Component trait and implementations

/// Marker trait for components
pub trait Component: 'static {}

impl Component for crate::ecs::components::Behavior {}
impl Component for crate::track::chunk::TerrainChunk {}
