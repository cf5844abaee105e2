//! The pre-registration allowlist. A username must be listed before an account can be
//! created for it.

use uuid::Uuid;

use super::{on_conflict, require_text};
use crate::access::{self, Action};
use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::models::{AddEnrolledRequest, EnrolledEntry};
use crate::repository::Repository;

/// add_entry
///
/// Lists `name`. Blank names are `InvalidInput("name")`; an existing entry is
/// `AlreadyListed`, whether found up front or reported by the store's unique index.
pub async fn add_entry(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    req: AddEnrolledRequest,
) -> ApiResult<EnrolledEntry> {
    access::authorize(principal, Action::AddToWhitelist)?;
    require_text(&req.name, "name")?;

    if repo.get_enrolled(&req.name).await?.is_some() {
        return Err(ApiError::AlreadyListed);
    }

    let entry = repo
        .add_enrolled(EnrolledEntry {
            id: Uuid::new_v4(),
            name: req.name,
        })
        .await
        .map_err(|e| on_conflict(e, ApiError::AlreadyListed))?;

    tracing::info!(name = %entry.name, "Added whitelist entry");
    Ok(entry)
}

pub async fn is_listed(repo: &dyn Repository, name: &str) -> ApiResult<bool> {
    Ok(repo.get_enrolled(name).await?.is_some())
}

pub async fn list_entries(repo: &dyn Repository) -> ApiResult<Vec<EnrolledEntry>> {
    Ok(repo.list_enrolled().await?)
}
