//! Grid construction tools

pub mod level_set;

pub use level_set::{create_level_set_sphere, make_sphere, signed_flood_fill};
