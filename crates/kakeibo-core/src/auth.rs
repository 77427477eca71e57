//! Per-request authentication state

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Who is making the request.
///
/// Re-derived on every request from the forwarded identity and a user
/// lookup; nothing is stored between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AuthState {
    /// No identity
    Unauthorized,
    /// Identity known but no user row yet
    Registering { email: String },
    /// Registered user
    Authenticated {
        email: String,
        name: String,
        user_id: String,
    },
}

/// Registered identity, extracted from [`AuthState::Authenticated`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl AuthState {
    pub fn email(&self) -> Option<&str> {
        match self {
            AuthState::Unauthorized => None,
            AuthState::Registering { email } | AuthState::Authenticated { email, .. } => Some(email),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    /// Require a registered user
    pub fn require_user(self) -> Result<CurrentUser, CoreError> {
        match self {
            AuthState::Unauthorized => Err(CoreError::Unauthorized),
            AuthState::Registering { email } => Err(CoreError::RegistrationRequired { email }),
            AuthState::Authenticated { email, name, user_id } => Ok(CurrentUser { user_id, name, email }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user() {
        assert!(matches!(AuthState::Unauthorized.require_user(), Err(CoreError::Unauthorized)));

        let registering = AuthState::Registering { email: "a@example.com".to_string() };
        assert_eq!(registering.email(), Some("a@example.com"));
        assert!(matches!(registering.require_user(), Err(CoreError::RegistrationRequired { .. })));

        let user = AuthState::Authenticated {
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            user_id: "u1".to_string(),
        }
        .require_user()
        .unwrap();
        assert_eq!(user.user_id, "u1");
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(AuthState::Registering { email: "a@example.com".to_string() }).unwrap();
        assert_eq!(json["state"], "registering");
        assert_eq!(json["email"], "a@example.com");
    }
}
