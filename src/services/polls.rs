//! Polls over upcoming roadmaps.

use uuid::Uuid;

use crate::access::{self, Action};
use crate::auth::Principal;
use crate::error::{ApiError, ApiResult, Entity};
use crate::models::{CreatePollRequest, Poll, PollView, VoteCount};
use crate::repository::Repository;

/// create_poll
///
/// Public. Duplicate options collapse to their first occurrence, and every option
/// starts with a zero count.
pub async fn create_poll(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    req: CreatePollRequest,
) -> ApiResult<PollView> {
    access::authorize(principal, Action::CreatePoll)?;

    let mut options: Vec<Uuid> = Vec::with_capacity(req.options.len());
    for option in req.options {
        if !options.contains(&option) {
            options.push(option);
        }
    }
    let votes = options
        .iter()
        .map(|&option_id| VoteCount { option_id, count: 0 })
        .collect();

    let poll = repo
        .create_poll(Poll {
            id: Uuid::new_v4(),
            options,
            votes,
        })
        .await?;

    tracing::info!(poll_id = %poll.id, options = poll.options.len(), "Created poll");
    poll_view(repo, poll).await
}

/// cast_vote
///
/// Adds one vote for `option_id`. An option outside the poll's list gets its own
/// tally entry rather than being rejected, and a caller may vote any number of times.
pub async fn cast_vote(
    repo: &dyn Repository,
    principal: Option<&Principal>,
    poll_id: Uuid,
    option_id: Uuid,
) -> ApiResult<PollView> {
    let principal = access::require(principal, Action::CastVote)?;

    if repo.get_poll(poll_id).await?.is_none() {
        return Err(ApiError::NotFound(Entity::Poll));
    }
    if !repo.increment_vote(poll_id, option_id).await? {
        return Err(ApiError::NotFound(Entity::Poll));
    }

    tracing::info!(poll_id = %poll_id, option_id = %option_id, voter = %principal.id, "Vote cast");
    get_poll(repo, poll_id).await
}

pub async fn get_poll(repo: &dyn Repository, poll_id: Uuid) -> ApiResult<PollView> {
    let poll = repo
        .get_poll(poll_id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Poll))?;
    poll_view(repo, poll).await
}

pub async fn list_polls(repo: &dyn Repository) -> ApiResult<Vec<PollView>> {
    let polls = repo.list_polls().await?;
    let mut views = Vec::with_capacity(polls.len());
    for poll in polls {
        views.push(poll_view(repo, poll).await?);
    }
    Ok(views)
}

/// Resolves option ids into upcoming roadmaps; ids with no matching record are left out.
pub async fn poll_view(repo: &dyn Repository, poll: Poll) -> ApiResult<PollView> {
    let options = repo.get_upcoming_many(&poll.options).await?;
    Ok(PollView {
        id: poll.id,
        options,
        votes: poll.votes,
    })
}
