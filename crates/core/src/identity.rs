use serde::{Deserialize, Serialize};

/// User id given to every anonymous caller.
pub const ANONYMOUS_USER: &str = "anonymous";

/// How a caller established its identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Token,
    Anonymous,
}

/// The user on whose behalf a store is accessed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub method: AuthMethod,
}

impl Identity {
    #[must_use]
    pub fn token(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            method: AuthMethod::Token,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user_id: ANONYMOUS_USER.to_string(),
            method: AuthMethod::Anonymous,
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.method == AuthMethod::Anonymous
    }
}
