//! News BFF - backend-for-frontend with a caching news proxy
//!
//! Fronts a rate-limited news API with an in-memory TTL cache and a
//! per-client request governor, and serves the consultation-booking and
//! chatbot-flow endpoints of the same frontend.

pub mod api;
pub mod booking;
pub mod cache;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod governor;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::{Config, Profile, SweepMode};
pub use tasks::spawn_cleanup_task;
