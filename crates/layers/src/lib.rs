pub mod catalog;
pub mod config;
pub mod layer;
pub mod registry;
pub mod selection;
pub mod symbology;
pub mod visibility;

pub use config::*;
pub use layer::*;
pub use registry::*;
