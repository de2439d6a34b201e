//! crates/painting_order_core/src/error.rs
//!
//! The error taxonomy of the ordering workflow. Every variant is recoverable:
//! the wizard's draft survives all of them.

/// Coarse classification used by callers to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any collaborator was contacted.
    Validation,
    /// The caller has no authenticated identity.
    Unauthenticated,
    /// The action is not allowed in the wizard's current state.
    Conflict,
    /// The catalog or the order store could not be reached.
    CollaboratorUnavailable,
    GenerationFailed,
    OrderPersistFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Either an AI prompt or customer notes must be provided")]
    EmptyPrompt,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Style catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("A preview is already being generated")]
    PreviewInFlight,

    #[error("Preview generation failed: {0}")]
    GenerationFailed(String),

    #[error("The order is already being submitted")]
    SubmitInFlight,

    #[error("Orders can only be submitted from the review step (current step: {0})")]
    NotAtReview(String),

    #[error("Failed to persist order: {0}")]
    OrderPersistFailed(String),

    #[error("The wizard is closed ({0})")]
    WizardClosed(String),
}

impl WizardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WizardError::InvalidInput(_) | WizardError::EmptyPrompt => ErrorKind::Validation,
            WizardError::Unauthenticated => ErrorKind::Unauthenticated,
            WizardError::PreviewInFlight
            | WizardError::SubmitInFlight
            | WizardError::NotAtReview(_)
            | WizardError::WizardClosed(_) => ErrorKind::Conflict,
            WizardError::CatalogUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            WizardError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            WizardError::OrderPersistFailed(_) => ErrorKind::OrderPersistFailed,
        }
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
