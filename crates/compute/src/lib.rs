pub mod aggregate;
pub mod config;
pub mod policy;
pub mod report;
pub mod simulation;
pub mod statistics;

pub use aggregate::*;
pub use config::*;
pub use policy::*;
