pub mod config;
pub mod error;
pub mod types;

pub use config::SpotterConfig;
pub use error::{Result, SpotterError};
pub use types::*;
