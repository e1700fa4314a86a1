//! Logged-in student context.
//!
//! Built once by [`crate::api::PortalClient::login`] and handed explicitly
//! to every client that needs the token or the quiz credentials. Nothing is
//! persisted; logging out consumes the context.

use std::fmt;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::User;

pub struct AuthContext {
    token: String,
    user: User,
}

/// What the quiz backend needs to identify a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCredentials {
    pub pin: String,
    pub username: String,
}

impl AuthContext {
    pub fn new(token: String, user: User) -> Self {
        info!(user = %user.username, "logged in");
        Self { token, user }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn quiz_credentials(&self) -> QuizCredentials {
        QuizCredentials {
            pin: self.user.pin.clone(),
            username: self.user.username.clone(),
        }
    }

    pub fn logout(self) {
        info!(user = %self.user.username, "logged out");
    }

    /// Logs out whatever `outcome` was, then hands it back unchanged.
    pub fn logout_with<T>(self, outcome: Result<T>) -> Result<T> {
        if let Err(err) = &outcome {
            warn!(%err, "logging out after a failed command");
        }
        self.logout();
        outcome
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .field("user", &self.user.username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;

    fn context() -> AuthContext {
        AuthContext::new(
            "tok".to_string(),
            User {
                username: "student1".to_string(),
                ..User::default()
            },
        )
    }

    #[test]
    fn test_logout_with_passes_outcome_through() {
        assert_eq!(context().logout_with(Ok(3)).unwrap(), 3);

        let failed: Result<()> = Err(PortalError::QuizOver);
        assert!(matches!(context().logout_with(failed), Err(PortalError::QuizOver)));
    }

    #[test]
    fn test_debug_hides_token() {
        let ctx = AuthContext::new(
            "secret-token".to_string(),
            User {
                username: "student1".to_string(),
                pin: "1234".to_string(),
                ..User::default()
            },
        );
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("secret-token"));
        assert_eq!(
            ctx.quiz_credentials(),
            QuizCredentials {
                pin: "1234".to_string(),
                username: "student1".to_string()
            }
        );
    }
}
