//! Entity-Component-System implementation
//!
//! A small entity store for streamed track content. Every entity has a
//! [`EntityRecord`] (name, tag, world-space transform, active flag, owner)
//! and may carry typed components such as a terrain chunk or a trigger
//! behavior.

pub mod world;
pub mod entity;
pub mod component;
pub mod components;

pub use world::World;
pub use entity::{Entity, EntityRecord};
pub use component::Component;
pub use components::{Behavior, EntityTag};
