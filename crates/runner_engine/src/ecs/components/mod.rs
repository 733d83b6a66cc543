//! ECS Components module
//!
//! Contains the components carried by streamed track content

pub mod tag;
pub mod behavior;

pub use tag::EntityTag;
pub use behavior::Behavior;
