pub mod bounds;
pub mod ids;
pub mod value;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use ids::*;
pub use value::*;
