// ubus session state
//
// The firmware represents "no session" with a fixed all-zero token rather
// than an absent one. Login swaps the sentinel for a real token; every
// other call must carry a real token or fail before touching the network.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Username/password pair for `session.login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub(crate) fn login_args(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

/// Opaque session token returned by `session.login`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Token sent with the login call and held while unauthenticated.
    pub const SENTINEL: &'static str = "00000000000000000000000000000000";

    pub fn sentinel() -> Self {
        Self(Self::SENTINEL.to_owned())
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == Self::SENTINEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::sentinel()
    }
}

// Tokens grant device access; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("SessionToken(<none>)")
        } else {
            f.write_str("SessionToken(****)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_thirty_two_zeros() {
        assert_eq!(SessionToken::SENTINEL.len(), 32);
        assert!(SessionToken::SENTINEL.chars().all(|c| c == '0'));
        assert!(SessionToken::default().is_sentinel());
    }

    #[test]
    fn debug_redacts_real_tokens() {
        let token = SessionToken::new("c0ffee");
        assert_eq!(format!("{token:?}"), "SessionToken(****)");
    }
}
