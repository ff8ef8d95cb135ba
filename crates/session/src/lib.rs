pub mod command;
pub mod config;
pub mod controller;
pub mod logging;
pub mod state;

pub use command::*;
pub use config::*;
pub use controller::*;
pub use state::*;
