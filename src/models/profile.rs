use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "HR")]
    Hr,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hr => "HR",
            Role::Candidate => "Candidate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            r if r.eq_ignore_ascii_case("hr") => Ok(Role::Hr),
            r if r.eq_ignore_ascii_case("candidate") => Ok(Role::Candidate),
            other => Err(Error::validation(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

/// The authenticated identity driving a dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn hr(id: Uuid) -> Self {
        Self { id, role: Role::Hr }
    }

    pub fn candidate(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Candidate,
        }
    }

    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }
}
