//! Foundation: math, entity handles, frame timing and logging setup

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
