//! Core error types

use thiserror::Error;

use crate::core::protocol::SurfaceId;
use crate::core::surface::SurfaceRole;

/// Core driver errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Wayland connection error: {0}")]
    Connection(String),

    #[error("Compositor does not advertise required global {0}")]
    MissingGlobal(&'static str),

    #[error("Wayland dispatch error: {0}")]
    Dispatch(String),

    #[error("Surface {surface} has role {current:?}, cannot change to {requested:?} without clearing it")]
    RoleConflict {
        surface: SurfaceId,
        current: SurfaceRole,
        requested: SurfaceRole,
    },

    #[error("Compositor rejected {role:?} role for surface {surface}")]
    RoleRejected { surface: SurfaceId, role: SurfaceRole },

    #[error("Surface {0} has been destroyed")]
    SurfaceDestroyed(SurfaceId),
}

impl CoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
