//! Forum Votes Service Library
//!
//! This library provides the service-level wiring of the forum votes
//! workspace: configuration from the environment, database connection and
//! migrations, dependency injection, tracing setup and the error type.

pub mod config;
pub mod errors;
pub mod telemetry;

pub use config::{Config, ConnectionMode, Dependencies, LogFormat};
pub use errors::ServiceError;
