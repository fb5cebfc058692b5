pub mod feature;
pub mod geometry;
pub mod picking;
pub mod world;

pub use feature::*;
pub use geometry::*;
pub use world::*;
