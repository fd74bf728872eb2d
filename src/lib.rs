pub mod artifacts;
pub mod cities;
pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod models;
pub mod prediction;
pub mod state;

pub use error::{ApiError, LoadError};
pub use state::AppState;
