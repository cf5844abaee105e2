//! Business engines. Each operation takes the repository handle and the caller's
//! principal, consults the access gate, and then reads or writes the store.
//!
//! Handlers stay thin: everything a rule depends on lives here so it can be exercised
//! directly against `MemoryRepository`.
pub mod accounts;
pub mod catalog;
pub mod enrollment;
pub mod polls;
pub mod whitelist;

use crate::error::{ApiError, ApiResult};
use crate::repository::StoreError;

/// Rejects missing or whitespace-only text fields.
pub(crate) fn require_text(value: &str, field: &'static str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(field));
    }
    Ok(())
}

/// Maps a store uniqueness violation onto the engine's own "already ..." error.
pub(crate) fn on_conflict(err: StoreError, conflict: ApiError) -> ApiError {
    match err {
        StoreError::Conflict(_) => conflict,
        other => ApiError::Store(other),
    }
}
