//! Offering code resolution.

use std::sync::Arc;

use registrar_core::offering::{normalize_explicit_code, random_code_candidate, Term};
use registrar_core::types::DbId;

use crate::error::{OfferingError, OfferingResult};
use crate::store::RecordStore;

type CandidateSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Produces unique 5-digit offering codes.
///
/// Draws random candidates and probes each against existing codes, up to
/// `max_attempts` times. When every candidate collides the flow fails with
/// [`OfferingError::CodeSpaceExhausted`].
#[derive(Clone)]
pub struct CodeGenerator {
    max_attempts: u32,
    candidates: CandidateSource,
}

impl CodeGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_candidates(max_attempts, || random_code_candidate(&mut rand::rng()))
    }

    /// Use a custom candidate source instead of the thread RNG.
    pub fn with_candidates(
        max_attempts: u32,
        candidates: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            candidates: Arc::new(candidates),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Use the caller's code when one is given, otherwise generate one.
    ///
    /// An explicit code is trimmed and taken as-is without a uniqueness
    /// probe; the store's unique key still rejects duplicates. A blank
    /// explicit code counts as absent.
    pub async fn resolve<S: RecordStore>(
        &self,
        store: &mut S,
        explicit: Option<&str>,
        course_id: DbId,
        term: &Term,
    ) -> OfferingResult<String> {
        match normalize_explicit_code(explicit) {
            Some(code) => {
                tracing::debug!(%code, "Using caller-supplied offering code");
                Ok(code)
            }
            None => self.generate(store, course_id, term).await,
        }
    }

    /// Draw candidates until one is not in use.
    pub async fn generate<S: RecordStore>(
        &self,
        store: &mut S,
        course_id: DbId,
        term: &Term,
    ) -> OfferingResult<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = (self.candidates)();
            if !store.code_exists(&candidate).await? {
                tracing::debug!(code = %candidate, attempt, course_id, %term, "Offering code generated");
                return Ok(candidate);
            }
            tracing::warn!(code = %candidate, attempt, "Offering code collision");
        }
        Err(OfferingError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}
