use crate::permissions::{PermissionStore, Permissions};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Body of `POST api/nvmeof/subsystem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct CreateSubsystemRequest {
    #[builder(setter(into))]
    pub nqn: String,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_namespaces: Option<u32>,
    #[builder(default = true)]
    pub enable_ha: bool,
}

impl CreateSubsystemRequest {
    /// Builds the request from raw form input.
    ///
    /// The namespace bound is coerced to a number and left out entirely when
    /// that number is zero or the input does not hold one; HA is always on.
    pub fn from_form_values(nqn: &str, max_namespaces: &str) -> Self {
        let max_namespaces = max_namespaces
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|max| *max != 0);

        Self {
            nqn: nqn.to_string(),
            max_namespaces,
            enable_ha: true,
        }
    }
}

/// Result of a call that may finish in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Finished,
    /// The backend answered 202 and keeps working on it as a task.
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsystem {
    pub nqn: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub namespace_count: Option<u32>,
    #[serde(default)]
    pub max_namespaces: Option<u32>,
    #[serde(default)]
    pub enable_ha: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Authenticated dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl PermissionStore for Session {
    fn permissions(&self) -> Permissions {
        self.permissions.clone()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
