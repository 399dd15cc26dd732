#![forbid(unsafe_code)]

//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use nodegrip_pick::PickError;

/// Errors surfaced by the `nodegrip` facade.
#[derive(Debug, Error)]
pub enum Error {
    /// Hit tester failure (capacity, readback, camera).
    #[error(transparent)]
    Pick(#[from] PickError),
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// `Result` with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
