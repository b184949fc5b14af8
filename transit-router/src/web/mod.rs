//! Web layer for the transit router.
//!
//! Provides JSON endpoints for looking up stops, running a search with any
//! algorithm, and comparing all algorithms on one trip.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
