//! Configuration module for the forum votes service.
//! Defines and manages application-wide settings and dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{Config, ConnectionMode, LogFormat};
