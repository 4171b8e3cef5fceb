//! API Module
//!
//! HTTP handlers, middleware and routing for the BFF REST API.
//!
//! # Endpoints
//! - `/news/*` - cached news proxy, behind the request governor
//! - `/consultations` - consultation booking workflow
//! - `/chatbot/flow` - static chatbot flow
//! - `GET /health` - liveness check

pub mod bookings;
pub mod governor;
pub mod handlers;
pub mod routes;
mod state;

pub use governor::client_identity;
pub use routes::create_router;
pub use state::{AppState, BOOKINGS_FILE};
