//! Roadmaps, their sections, and upcoming-roadmap teasers.
//!
//! A roadmap is created as a draft (unless told otherwise) together with all of its
//! sections, and can be published exactly once. There is no way back to draft.

use uuid::Uuid;

use super::require_text;
use crate::access::{self, Action};
use crate::auth::Principal;
use crate::error::{ApiError, ApiResult, Entity};
use crate::models::{
    CreateRoadmapRequest, CreateUpcomingRequest, Roadmap, RoadmapView, Section, Upcoming,
};
use crate::repository::Repository;

/// create_roadmap
///
/// Admin only. Validates the whole request before anything is written, assigns ids to
/// the sections, and hands sections and roadmap to the store as one atomic unit: either
/// everything is persisted or nothing is.
pub async fn create_roadmap(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    req: CreateRoadmapRequest,
) -> ApiResult<RoadmapView> {
    access::authorize(principal, Action::CreateRoadmap)?;

    require_text(&req.title, "title")?;
    require_text(&req.description, "description")?;
    require_text(&req.image, "image")?;
    if req.sections.is_empty() {
        return Err(ApiError::InvalidInput("sections"));
    }
    for section in &req.sections {
        require_text(&section.title, "section.title")?;
        require_text(&section.description, "section.description")?;
    }

    let sections: Vec<Section> = req
        .sections
        .into_iter()
        .map(|input| Section {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            learning_objectives: input.learning_objectives,
            modules: input.modules,
            images: input.images,
        })
        .collect();

    let roadmap = Roadmap {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        image: req.image,
        sections: sections.iter().map(|s| s.id).collect(),
        draft: req.draft.unwrap_or(true),
    };

    let created = repo.create_roadmap(roadmap, sections.clone()).await?;
    tracing::info!(
        roadmap_id = %created.id,
        sections = created.sections.len(),
        draft = created.draft,
        "Created roadmap"
    );

    Ok(RoadmapView {
        id: created.id,
        title: created.title,
        description: created.description,
        image: created.image,
        sections,
        draft: created.draft,
    })
}

/// publish_roadmap
///
/// Admin only. `NotFound` when missing, `AlreadyPublished` when not a draft. The store
/// only flips rows that are still drafts, so a publish that loses a race with another
/// one also reports `AlreadyPublished`.
pub async fn publish_roadmap(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    roadmap_id: Uuid,
) -> ApiResult<RoadmapView> {
    access::authorize(principal, Action::PublishRoadmap)?;

    let roadmap = repo
        .get_roadmap(roadmap_id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Roadmap))?;
    if !roadmap.draft {
        return Err(ApiError::AlreadyPublished);
    }

    let published = repo
        .publish_roadmap(roadmap_id)
        .await?
        .ok_or(ApiError::AlreadyPublished)?;

    tracing::info!(roadmap_id = %published.id, "Published roadmap");
    roadmap_view(repo, published).await
}

/// list_roadmaps
///
/// Published roadmaps only, unless `include_drafts` is set. The flag is honoured for
/// any caller.
pub async fn list_roadmaps(repo: &dyn Repository, include_drafts: bool) -> ApiResult<Vec<RoadmapView>> {
    let roadmaps = repo.list_roadmaps(include_drafts).await?;
    let mut views = Vec::with_capacity(roadmaps.len());
    for roadmap in roadmaps {
        views.push(roadmap_view(repo, roadmap).await?);
    }
    Ok(views)
}

/// create_upcoming
///
/// Admin only; all three fields are required.
pub async fn create_upcoming(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    req: CreateUpcomingRequest,
) -> ApiResult<Upcoming> {
    access::authorize(principal, Action::CreateUpcoming)?;

    require_text(&req.title, "title")?;
    require_text(&req.description, "description")?;
    require_text(&req.image, "image")?;

    let upcoming = repo
        .create_upcoming(Upcoming {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            image: req.image,
        })
        .await?;

    tracing::info!(upcoming_id = %upcoming.id, "Created upcoming roadmap");
    Ok(upcoming)
}

pub async fn list_upcoming(repo: &dyn Repository) -> ApiResult<Vec<Upcoming>> {
    Ok(repo.list_upcoming().await?)
}

/// Resolves a roadmap's section ids into section records, in roadmap order.
pub async fn roadmap_view(repo: &dyn Repository, roadmap: Roadmap) -> ApiResult<RoadmapView> {
    let sections = repo.get_sections(&roadmap.sections).await?;
    Ok(RoadmapView {
        id: roadmap.id,
        title: roadmap.title,
        description: roadmap.description,
        image: roadmap.image,
        sections,
        draft: roadmap.draft,
    })
}
