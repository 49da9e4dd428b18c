//! Error types for easel_core

use thiserror::Error;

use crate::command::CommandKind;

/// Errors raised while recording canvas commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// Growing storage failed
    #[error("allocation of {requested} command slots failed")]
    Allocation { requested: usize },

    /// A command carried a NaN or infinite coordinate
    #[error("{0} command has non-finite geometry")]
    NonFinite(CommandKind),

    /// The buffer is already borrowed by an in-flight drain
    #[error("command buffer is busy")]
    BufferBusy,
}

/// Result type for easel_core operations
pub type Result<T> = std::result::Result<T, CanvasError>;
