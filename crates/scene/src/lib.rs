pub mod feature;
pub mod geometry;
pub mod intersects;

pub use feature::*;
pub use geometry::*;
pub use intersects::*;
