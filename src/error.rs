//! Unified error type for the button subsystem.
//!
//! Every fallible caller-facing operation (registration, handler and
//! timing configuration) returns one of these synchronously.  The tick and
//! dispatch paths never produce errors: a saturated delivery queue drops a
//! slot and bumps a diagnostic counter instead (see [`crate::diagnostics`]).
//! All variants are `Copy` so they pass through the registry without
//! allocation.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The registry already holds the maximum number of buttons.
    CapacityExceeded,
    /// The pin / level-source descriptor is invalid or already in use.
    InvalidSource,
    /// A parameter is out of range or malformed.
    /// The `&'static str` names the offending parameter.
    InvalidParameter(&'static str),
    /// The button id is stale (never issued, or shifted by a deregistration).
    NotFound,
    /// The dispatch worker could not be created.
    OutOfResources,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "button registry full"),
            Self::InvalidSource => write!(f, "invalid input source"),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Self::NotFound => write!(f, "button not found"),
            Self::OutOfResources => write!(f, "out of resources"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
