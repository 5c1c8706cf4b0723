//! API layer - HTTP endpoints

pub mod health;
pub mod router;
pub mod state;
pub mod types;
pub mod v1;

pub use router::build_router;
pub use state::AppState;
