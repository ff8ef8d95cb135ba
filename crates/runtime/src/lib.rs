pub mod cycle;
pub mod event_bus;
pub mod metrics;

pub use cycle::*;
pub use event_bus::*;
pub use metrics::*;
