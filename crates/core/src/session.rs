//! Sessions: one per authenticated login.
//!
//! A session carries the caller's identity and the number of paid tool
//! dispatches made so far. It lives only as long as the login; a new
//! session starts again from zero.

use serde::{Deserialize, Serialize};

/// Who is making the request, as supplied by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: true,
        }
    }
}

/// Per-login state.
///
/// `usage_count` is only ever advanced through [`Session::increment_usage`],
/// which the quota guard calls after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: UserIdentity,
    usage_count: u32,
}

impl Session {
    pub fn new(user: UserIdentity) -> Self {
        Self {
            user,
            usage_count: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn increment_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
    }
}
