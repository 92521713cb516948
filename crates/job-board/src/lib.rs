//! Client for the job board backend: session and identity, the HTTP gateway,
//! per-resource facades, the application status workflow and the page views
//! built on top of them.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod session;
pub mod telemetry;
pub mod views;
pub mod workflows;

pub use error::AppError;
