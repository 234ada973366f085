pub mod args;
pub mod collector;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod upstream;

pub use collector::Collector;
pub use config::Config;
pub use error::Error;
pub use error::FetchError;
pub use error::Result;
