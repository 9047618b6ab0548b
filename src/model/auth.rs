//! Authentication values
//!
//! Only the method tag is ever written to preferences. CHAP credentials
//! travel through the secret store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication method tag as stored in preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    None,
    Chap,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "None",
            AuthMethod::Chap => "CHAP",
        }
    }

    /// Parse a stored tag. Anything other than the two known values,
    /// including the empty placeholder, yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "None" => Some(AuthMethod::None),
            "CHAP" => Some(AuthMethod::Chap),
            _ => None,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CHAP user name and shared secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapSecret {
    pub user: String,
    pub secret: String,
}

impl ChapSecret {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ChapSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChapSecret")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Authentication configured for a target or the initiator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    Chap(ChapSecret),
}

impl Auth {
    pub fn chap(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Auth::Chap(ChapSecret::new(user, secret))
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Auth::None => AuthMethod::None,
            Auth::Chap(_) => AuthMethod::Chap,
        }
    }
}
