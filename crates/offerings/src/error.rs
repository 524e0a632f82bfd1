use registrar_core::error::CoreError;

/// Errors surfaced by the offering flows.
#[derive(Debug, thiserror::Error)]
pub enum OfferingError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No unique offering code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}

impl OfferingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotFound { .. }))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Core(CoreError::Validation(_)))
    }
}

pub type OfferingResult<T> = Result<T, OfferingError>;
