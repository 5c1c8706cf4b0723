//! HTTP API types

pub mod error;
pub mod json;
pub mod session;

pub use error::{ApiError, ApiErrorBody, ApiErrorType};
pub use json::Json;
pub use session::{CreateSessionRequest, FeedbackRequest};
