//! Per-account progress through roadmaps.
//!
//! For each (account, roadmap) pair: `NotEnrolled -> Enrolled(no sections) ->
//! Enrolled(some sections)`. Every completed section is worth [`SECTION_REWARD`]
//! points. Both transitions are checked here first and then enforced again by the
//! store's unique constraints, so concurrent duplicates cannot both succeed.

use uuid::Uuid;

use super::{accounts, on_conflict};
use crate::access::{self, Action};
use crate::auth::Principal;
use crate::error::{ApiError, ApiResult, Entity};
use crate::models::AccountView;
use crate::repository::{Repository, StoreError};

/// Points credited for each completed section.
pub const SECTION_REWARD: i32 = 10;

/// enroll
///
/// Failure order: `Unauthenticated`, `NotFound(Roadmap)`, `DraftRoadmap`,
/// `NotFound(Account)`, `AlreadyEnrolled`.
pub async fn enroll(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    roadmap_id: Uuid,
) -> ApiResult<AccountView> {
    let principal = access::require(principal, Action::Enroll)?;

    let roadmap = repo
        .get_roadmap(roadmap_id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Roadmap))?;
    if roadmap.draft {
        return Err(ApiError::DraftRoadmap);
    }

    let account = repo
        .get_account(principal.id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Account))?;
    if account.progress_for(roadmap_id).is_some() {
        return Err(ApiError::AlreadyEnrolled);
    }

    repo.add_progress(account.id, roadmap_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound(Entity::Account),
            other => on_conflict(other, ApiError::AlreadyEnrolled),
        })?;

    tracing::info!(account_id = %account.id, roadmap_id = %roadmap_id, "Enrolled in roadmap");
    refreshed_view(repo, account.id).await
}

/// complete_section
///
/// Failure order: `Unauthenticated`, `NotFound(Account)`, `NotEnrolled`,
/// `NotFound(Roadmap)`, `SectionNotInRoadmap`, `AlreadyCompleted`. Repeating a
/// completed section is an error, not a no-op.
pub async fn complete_section(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    roadmap_id: Uuid,
    section_id: Uuid,
) -> ApiResult<AccountView> {
    let principal = access::require(principal, Action::CompleteSection)?;

    let account = repo
        .get_account(principal.id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Account))?;
    let progress = account
        .progress_for(roadmap_id)
        .ok_or(ApiError::NotEnrolled)?;

    let roadmap = repo
        .get_roadmap(roadmap_id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Roadmap))?;
    if !roadmap.sections.contains(&section_id) {
        return Err(ApiError::SectionNotInRoadmap);
    }
    if progress.completed_sections.contains(&section_id) {
        return Err(ApiError::AlreadyCompleted);
    }

    repo.complete_section(account.id, roadmap_id, section_id, SECTION_REWARD)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotEnrolled,
            other => on_conflict(other, ApiError::AlreadyCompleted),
        })?;

    tracing::info!(
        account_id = %account.id,
        roadmap_id = %roadmap_id,
        section_id = %section_id,
        reward = SECTION_REWARD,
        "Completed section"
    );
    refreshed_view(repo, account.id).await
}

async fn refreshed_view(repo: &dyn Repository, account_id: Uuid) -> ApiResult<AccountView> {
    let account = repo
        .get_account(account_id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Account))?;
    accounts::account_view(repo, account).await
}
