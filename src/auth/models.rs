use serde::{Deserialize, Serialize};

/// Represents an authenticated user, as stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable user identifier. Articles reference their owner through it.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// User email address.
    pub email: String,
}

/// A login account from the configured user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl UserAccount {
    pub fn new(username: &str, password: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        }
    }

    /// The identity placed in the session once this account has logged in.
    pub fn to_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: format!("user-{}", self.username),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// The built-in accounts available when no users are configured.
pub fn demo_accounts() -> Vec<UserAccount> {
    vec![
        UserAccount::new("demo", "demo", "demo@demo.quill.dev"),
        UserAccount::new("alice", "alice", "alice@demo.quill.dev"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_user_derives_stable_id() {
        let account = UserAccount::new("demo", "secret", "demo@example.com");
        let user = account.to_user();
        assert_eq!(user.user_id, "user-demo");
        assert_eq!(user.username, "demo");
        assert_eq!(user.email, "demo@example.com");
        assert_eq!(account.to_user(), user);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let user = UserAccount::new("alice", "alice", "a@example.com").to_user();
        let json = serde_json::to_string(&user).unwrap();
        let deserialized: AuthenticatedUser = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, user);
    }

    #[test]
    fn test_account_email_defaults_to_empty() {
        let account: UserAccount =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        assert!(account.email.is_empty());
    }
}
