mod client;
mod models;

pub use client::DashboardClient;
pub use models::*;

use crate::tasks::TaskList;
use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid dashboard URL: {0}")]
    InvalidUrl(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Dashboard responded with {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("Unable to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// NVMe-oF endpoints of the dashboard REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NvmeofApi: Send + Sync {
    async fn list_subsystems(&self) -> Result<Vec<Subsystem>, ApiError>;

    async fn get_subsystem(&self, nqn: &str) -> Result<Subsystem, ApiError>;

    /// Any failure to fetch the subsystem counts as "not present".
    async fn is_subsystem_present(&self, nqn: &str) -> Result<bool, ApiError>;

    async fn create_subsystem(
        &self,
        request: &CreateSubsystemRequest,
    ) -> Result<CallOutcome, ApiError>;
}

/// Background task listing used to follow calls the backend accepted but has
/// not finished yet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn tasks(&self, name: &str) -> Result<TaskList, ApiError>;
}
