use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{AppState, credentials, repository::Repository};

/// Principal
///
/// The authenticated identity for one request. Derived from a valid token plus the
/// account it names; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    /// Read from the stored account, not from the token.
    pub is_admin: bool,
}

/// Identity
///
/// The outcome of identity resolution, placed in the request extensions by
/// [`resolve_identity`] before any handler runs. `Identity(None)` is an anonymous
/// caller; handlers never reject at this layer, the engines decide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(pub Option<Principal>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Reads the identity resolved by the middleware. A route that somehow bypassed the
/// middleware sees an anonymous caller rather than an error.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

/// resolve_principal
///
/// Turns a raw `Authorization` header value into a principal.
///
/// Every failure degrades to `None` instead of an error:
/// 1. No header, or not of the form `Bearer <token>`.
/// 2. Token malformed or signed with another secret (logged at `warn`).
/// 3. Token valid but its account no longer exists.
/// 4. The account lookup itself failed (logged at `error`).
pub async fn resolve_principal(
    authorization: Option<&str>,
    repo: &dyn Repository,
    secret: &str,
) -> Option<Principal> {
    let token = authorization?.strip_prefix("Bearer ")?;

    let claims = match credentials::verify_token(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid bearer token");
            return None;
        }
    };

    match repo.get_account(claims.id).await {
        Ok(Some(account)) => Some(Principal {
            id: account.id,
            is_admin: account.is_admin,
        }),
        Ok(None) => {
            tracing::warn!(account_id = %claims.id, "Token subject no longer exists");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Account lookup failed during identity resolution");
            None
        }
    }
}

/// resolve_identity
///
/// Middleware run once per request for every route: resolves the caller and stores
/// the read-only [`Identity`] in the request extensions.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let principal = resolve_principal(
        authorization.as_deref(),
        state.repo.as_ref(),
        &state.config.jwt_secret,
    )
    .await;

    if let Some(p) = &principal {
        tracing::debug!(account_id = %p.id, is_admin = p.is_admin, "Request authenticated");
    }

    request.extensions_mut().insert(Identity(principal));
    next.run(request).await
}
