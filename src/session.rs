//! Per-role authentication state
//!
//! The workflow acts as three users at once. Each role gets its own bearer
//! token from `POST token/`, and the user id is resolved right after through
//! `GET users/profile/`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::api::types::Profile;
use crate::api::ApiClient;
use crate::common::{Error, Result};

/// A role the workflow acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Client,
    Manager,
    Admin,
}

impl Role {
    /// Login order used by the workflow
    pub const ALL: [Role; 3] = [Role::Client, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "client" | "cliente" => Ok(Role::Client),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(Error::Config(format!(
                "Unknown role '{}'. Expected one of: client, manager, admin",
                other
            ))),
        }
    }
}

/// Username/password pair for `POST token/`
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Who a role turned out to be after login
#[derive(Debug, Clone)]
pub struct LoggedInUser {
    pub username: String,
    /// None when the profile endpoint did not answer
    pub user_id: Option<i64>,
    /// Role name as reported by the backend
    pub backend_role: Option<String>,
}

/// Tokens and identities of every logged-in role
#[derive(Debug, Default)]
pub struct Session {
    tokens: BTreeMap<Role, AccessToken>,
    users: BTreeMap<Role, LoggedInUser>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for a role, failing if that role never logged in
    pub fn token(&self, role: Role) -> Result<&AccessToken> {
        self.tokens.get(&role).ok_or(Error::NotAuthenticated(role))
    }

    /// Logged-in users in role order
    pub fn users(&self) -> impl Iterator<Item = (Role, &LoggedInUser)> {
        self.users.iter().map(|(role, user)| (*role, user))
    }

    pub fn is_logged_in(&self, role: Role) -> bool {
        self.tokens.contains_key(&role)
    }

    /// Obtain a token for `role` and resolve the user's profile
    ///
    /// A failed token request is an error. A failed profile lookup is not:
    /// the role is still usable, only its user id stays unknown.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        role: Role,
        credentials: &Credentials,
    ) -> Result<&LoggedInUser> {
        tracing::info!(%role, username = %credentials.username, "logging in");

        let pair = api
            .obtain_token(&credentials.username, &credentials.password)
            .await?;
        let token = AccessToken::new(pair.access);

        let profile = match api.profile(&token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(%role, error = %e, "profile lookup failed after login");
                None
            }
        };

        let user = logged_in_user(&credentials.username, profile);
        self.tokens.insert(role, token);
        self.users.insert(role, user);
        self.users.get(&role).ok_or(Error::NotAuthenticated(role))
    }
}

fn logged_in_user(username: &str, profile: Option<Profile>) -> LoggedInUser {
    match profile {
        Some(p) => LoggedInUser {
            username: p.username.unwrap_or_else(|| username.to_string()),
            user_id: Some(p.id),
            backend_role: p.role,
        },
        None => LoggedInUser {
            username: username.to_string(),
            user_id: None,
            backend_role: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("Cliente".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("cashier".parse::<Role>().is_err());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.bearer(), "Bearer eyJhbGciOi.secret");
    }

    #[test]
    fn test_missing_token_is_not_authenticated() {
        let session = Session::new();
        assert!(matches!(
            session.token(Role::Manager),
            Err(Error::NotAuthenticated(Role::Manager))
        ));
        assert!(!session.is_logged_in(Role::Manager));
    }

    #[test]
    fn test_new_session_lists_no_users() {
        assert_eq!(Session::new().users().count(), 0);
    }

    #[test]
    fn test_user_without_profile_keeps_username() {
        let user = logged_in_user("juan_cliente", None);
        assert_eq!(user.username, "juan_cliente");
        assert_eq!(user.user_id, None);
    }
}
