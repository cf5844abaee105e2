//! The access policy applied by every operation.
//!
//! Roles are fixed: a caller is anonymous, a regular user, or an admin. The policy is a
//! pure function of the caller and the requested action; anything that needs the store
//! (username availability, whitelist membership) is looked up by the caller and passed
//! in as part of the [`Action`].

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};

/// Action
///
/// A gated operation, with whatever facts the policy needs to decide on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadProfile,
    ListAccounts,
    CreateRoadmap,
    CreateUpcoming,
    PublishRoadmap,
    CreateAccount { username_taken: bool, whitelisted: bool },
    Login,
    Enroll,
    CompleteSection,
    CreatePoll,
    CastVote,
    AddToWhitelist,
}

/// authorize
///
/// | Action                                      | Requirement                        |
/// |---------------------------------------------|------------------------------------|
/// | `ReadProfile`, `Enroll`, `CompleteSection`, `CastVote` | principal present       |
/// | `CreateRoadmap`, `CreateUpcoming`, `PublishRoadmap` | admin                |
/// | `CreateAccount`                             | username unused and whitelisted    |
/// | `Login`, `CreatePoll`, `AddToWhitelist`, `ListAccounts` | none             |
///
/// Read-only listings (roadmaps, upcoming, polls, whitelist) are public and do not
/// pass through the gate.
pub fn authorize(principal: Option<&Principal>, action: Action) -> ApiResult<()> {
    match action {
        Action::ReadProfile | Action::Enroll | Action::CompleteSection | Action::CastVote => {
            principal.map(|_| ()).ok_or(ApiError::Unauthenticated)
        }
        Action::CreateRoadmap | Action::CreateUpcoming | Action::PublishRoadmap => match principal {
            None => Err(ApiError::Unauthenticated),
            Some(p) if !p.is_admin => Err(ApiError::Forbidden),
            Some(_) => Ok(()),
        },
        Action::CreateAccount {
            username_taken,
            whitelisted,
        } => {
            if username_taken {
                Err(ApiError::AlreadyExists)
            } else if !whitelisted {
                Err(ApiError::NotWhitelisted)
            } else {
                Ok(())
            }
        }
        Action::Login | Action::CreatePoll | Action::AddToWhitelist | Action::ListAccounts => {
            Ok(())
        }
    }
}

/// Like [`authorize`], for actions that need a caller: returns the principal.
pub fn require(principal: Option<&Principal>, action: Action) -> ApiResult<&Principal> {
    authorize(principal, action)?;
    principal.ok_or(ApiError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            is_admin: false,
        }
    }

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            is_admin: true,
        }
    }

    #[test]
    fn test_admin_actions_distinguish_anonymous_from_non_admin() {
        for action in [
            Action::CreateRoadmap,
            Action::CreateUpcoming,
            Action::PublishRoadmap,
        ] {
            assert_eq!(authorize(None, action), Err(ApiError::Unauthenticated));
            assert_eq!(authorize(Some(&user()), action), Err(ApiError::Forbidden));
            assert_eq!(authorize(Some(&admin()), action), Ok(()));
        }
    }

    #[test]
    fn test_member_actions_need_any_principal() {
        for action in [
            Action::ReadProfile,
            Action::Enroll,
            Action::CompleteSection,
            Action::CastVote,
        ] {
            assert_eq!(authorize(None, action), Err(ApiError::Unauthenticated));
            assert_eq!(authorize(Some(&user()), action), Ok(()));
            assert_eq!(authorize(Some(&admin()), action), Ok(()));
        }
    }

    #[test]
    fn test_public_actions_allow_anonymous() {
        for action in [
            Action::Login,
            Action::CreatePoll,
            Action::AddToWhitelist,
            Action::ListAccounts,
        ] {
            assert_eq!(authorize(None, action), Ok(()));
        }
    }

    #[test]
    fn test_account_creation_rules() {
        let taken = Action::CreateAccount {
            username_taken: true,
            whitelisted: true,
        };
        let unlisted = Action::CreateAccount {
            username_taken: false,
            whitelisted: false,
        };
        let ok = Action::CreateAccount {
            username_taken: false,
            whitelisted: true,
        };
        assert_eq!(authorize(None, taken), Err(ApiError::AlreadyExists));
        assert_eq!(authorize(None, unlisted), Err(ApiError::NotWhitelisted));
        assert_eq!(authorize(None, ok), Ok(()));
        // Being logged in grants nothing extra.
        assert_eq!(authorize(Some(&admin()), unlisted), Err(ApiError::NotWhitelisted));
    }

    #[test]
    fn test_require_returns_the_principal() {
        let p = user();
        assert_eq!(require(Some(&p), Action::Enroll), Ok(&p));
        assert_eq!(require(None, Action::Enroll), Err(ApiError::Unauthenticated));
    }
}
