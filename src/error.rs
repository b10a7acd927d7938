//! Error types surfaced by the window registry and window construction.
//!
//! Two classes of failure exist: configuration mistakes, which are fatal at
//! construction time, and protocol misuse, which a correct caller never
//! triggers. Broken internal invariants are not errors; they panic.

use thiserror::Error;

use crate::layout::Size;
use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Configuration,
    ProtocolMisuse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window id must not be empty")]
    InvalidId,
    #[error("a window with id `{0}` is already registered")]
    DuplicateId(WindowId),
    #[error("window `{id}` has an invalid minimum size {min}: both dimensions must be non-zero")]
    InvalidMinSize { id: String, min: Size },
    #[error("window `{id}` has a maximum size {max} smaller than its minimum size {min}")]
    InvalidMaxSize { id: String, min: Size, max: Size },
    #[error("unknown starting position `{0}`")]
    InvalidPlacement(String),
    #[error("a window bar is already bound to the registry")]
    BarAlreadyBound,
    #[error("no window bar is bound to the registry")]
    NoBarBound,
    #[error("window `{0}` is not registered")]
    NotFound(WindowId),
    #[error("no mounting callback registered for `{0}`")]
    UnknownCallback(String),
    #[error("window `{0}` has been torn down and cannot be registered again")]
    WindowDestroyed(WindowId),
}

impl WmError {
    pub fn class(&self) -> ErrorClass {
        match self {
            WmError::InvalidId
            | WmError::DuplicateId(_)
            | WmError::InvalidMinSize { .. }
            | WmError::InvalidMaxSize { .. }
            | WmError::InvalidPlacement(_) => ErrorClass::Configuration,
            WmError::BarAlreadyBound
            | WmError::NoBarBound
            | WmError::NotFound(_)
            | WmError::UnknownCallback(_)
            | WmError::WindowDestroyed(_) => ErrorClass::ProtocolMisuse,
        }
    }
}
