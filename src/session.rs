use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account kind selected on the login form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Pharmacist,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Pharmacist => "pharmacist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "u" => Ok(Role::User),
            "pharmacist" | "p" => Ok(Role::Pharmacist),
            _ => Err("Allowed roles: user, pharmacist"),
        }
    }
}

/// In-memory record of a successful authentication.
///
/// The token is opaque and never decoded: the role is whatever the form had
/// selected when the credentials were exchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    token: String,
    role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
