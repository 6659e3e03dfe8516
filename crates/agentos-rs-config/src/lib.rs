//! Configuration models and loading for the AgentOS gatekeepers.
//!
//! This crate owns the config schema, JSON5 file loading, environment
//! overrides, and human readable size parsing. The gatekeepers turn the
//! loaded config into immutable policies once at startup.

mod error;
mod loader;
mod model;
mod size;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Environment variable names consulted by the loader.
pub use loader::{ENV_ALLOWED_COMMANDS, ENV_MAX_FILE_SIZE};
/// Configuration schema models.
pub use model::*;
/// Size string parsing.
pub use size::{SizeParseError, parse_size};
