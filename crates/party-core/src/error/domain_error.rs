//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::ItemId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Queue item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Pending record not found: {0}")]
    PendingNotFound(uuid::Uuid),

    // =========================================================================
    // Structural Errors
    // =========================================================================
    #[error("Cannot move the currently playing item")]
    CannotMoveCurrent,

    #[error("Reorder offset out of range: {offset} (upcoming length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Get an error code string for logging and host UI surfaces
    pub fn code(&self) -> &'static str {
        match self {
            Self::ItemNotFound(_) => "UNKNOWN_ITEM",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::PendingNotFound(_) => "UNKNOWN_PENDING",
            Self::CannotMoveCurrent => "CANNOT_MOVE_CURRENT",
            Self::OffsetOutOfRange { .. } => "OFFSET_OUT_OF_RANGE",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound(_) | Self::MemberNotFound(_) | Self::PendingNotFound(_)
        )
    }
}

/// Errors surfaced by the playback collaborator
///
/// These are logged and shown to the host; they never corrupt party state.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Playback not authorized")]
    NotAuthorized,

    #[error("Catalog search failed: {0}")]
    SearchFailed(String),

    #[error("Playback command failed: {0}")]
    CommandFailed(String),
}
