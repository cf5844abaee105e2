//! Registration, login, and the populated account read model.

use uuid::Uuid;

use super::{catalog, on_conflict, require_text, whitelist};
use crate::access::{self, Action};
use crate::auth::Principal;
use crate::credentials::{self, Claims};
use crate::error::{ApiError, ApiResult, Entity};
use crate::models::{Account, AccountView, CreateUserRequest, LoginRequest, ProgressView, Token};
use crate::repository::Repository;

/// create_user
///
/// Registers a whitelisted username. Fails with `InvalidInput` on a blank username or
/// password, `AlreadyExists` when the username is taken (including a concurrent
/// registration caught by the store), and `NotWhitelisted` when not listed.
pub async fn create_user(repo: &dyn Repository, req: CreateUserRequest) -> ApiResult<AccountView> {
    require_text(&req.username, "username")?;
    require_text(&req.password, "password")?;

    let username_taken = repo.get_account_by_username(&req.username).await?.is_some();
    let whitelisted = whitelist::is_listed(repo, &req.username).await?;
    access::authorize(
        None,
        Action::CreateAccount {
            username_taken,
            whitelisted,
        },
    )?;

    let password_hash = credentials::hash_password(&req.password)?;
    let account = repo
        .create_account(Account {
            id: Uuid::new_v4(),
            username: req.username,
            password_hash,
            is_admin: req.is_admin,
            points: 0,
            progress: vec![],
        })
        .await
        .map_err(|e| on_conflict(e, ApiError::AlreadyExists))?;

    tracing::info!(account_id = %account.id, username = %account.username, "Created account");
    account_view(repo, account).await
}

/// login
///
/// Exchanges a username and password for a signed token. Blank fields are
/// `InvalidInput`, an unknown username `NotFound`, a wrong password
/// `InvalidCredentials`.
pub async fn login(repo: &dyn Repository, secret: &str, req: LoginRequest) -> ApiResult<Token> {
    access::authorize(None, Action::Login)?;
    require_text(&req.username, "username")?;
    require_text(&req.password, "password")?;

    let account = repo
        .get_account_by_username(&req.username)
        .await?
        .ok_or(ApiError::NotFound(Entity::Account))?;

    if !credentials::verify_password(&req.password, &account.password_hash)? {
        tracing::warn!(username = %req.username, "Rejected login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let claims = Claims::new(account.id, &account.username, account.is_admin);
    Ok(Token {
        value: credentials::issue_token(&claims, secret)?,
    })
}

/// me
///
/// The caller's own account. `NotFound` if it vanished after the request was
/// authenticated.
pub async fn me(repo: &dyn Repository, principal: Option<&Principal>) -> ApiResult<AccountView> {
    let principal = access::require(principal, Action::ReadProfile)?;
    let account = repo
        .get_account(principal.id)
        .await?
        .ok_or(ApiError::NotFound(Entity::Account))?;
    account_view(repo, account).await
}

/// list_accounts
///
/// Open to any caller, like the other catalog listings.
pub async fn list_accounts(
    repo: &dyn Repository,
    principal: Option<&Principal>,
) -> ApiResult<Vec<AccountView>> {
    access::authorize(principal, Action::ListAccounts)?;
    let accounts = repo.list_accounts().await?;
    let mut views = Vec::with_capacity(accounts.len());
    for account in accounts {
        views.push(account_view(repo, account).await?);
    }
    Ok(views)
}

/// account_view
///
/// Drops the password hash and resolves each progress entry into its roadmap (with
/// sections) and completed section records.
pub async fn account_view(repo: &dyn Repository, account: Account) -> ApiResult<AccountView> {
    let mut progress = Vec::with_capacity(account.progress.len());
    for entry in account.progress {
        let roadmap = match repo.get_roadmap(entry.roadmap_id).await? {
            Some(roadmap) => Some(catalog::roadmap_view(repo, roadmap).await?),
            None => None,
        };
        let completed_sections = repo.get_sections(&entry.completed_sections).await?;
        progress.push(ProgressView {
            roadmap,
            completed_sections,
        });
    }

    Ok(AccountView {
        id: account.id,
        username: account.username,
        is_admin: account.is_admin,
        points: account.points,
        progress,
    })
}
