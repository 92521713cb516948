//! Gateway to the job board REST backend.

pub mod client;
pub mod error;

pub use client::{http_client, ApiClient};
pub use error::{describe_error, ApiError, ErrorBody, FALLBACK_MESSAGE};
