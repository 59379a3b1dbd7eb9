use crate::api::models::{ErrorBody, LoginRequest};
use crate::api::{
    ApiError, CallOutcome, CreateSubsystemRequest, NvmeofApi, Session, Subsystem, TaskApi,
};
use crate::config::ClientConfig;
use crate::tasks::TaskList;
use async_trait::async_trait;
use http::header::ACCEPT;
use http::{Method, StatusCode};
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_tracing::{OtelName, TracingMiddleware};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const API_VERSION: &str = "application/vnd.ceph.api.v1.0+json";

/// REST client for the storage dashboard.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Arc<ClientWithMiddleware>,
    base_url: Url,
    token: Option<String>,
}

impl DashboardClient {
    pub fn new(client: Arc<ClientWithMiddleware>, base_url: &Url) -> Self {
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config
            .dashboard_url()
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;

        let client = reqwest::ClientBuilder::new()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure())
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let client = Arc::new(
            ClientBuilder::new(client)
                .with(TracingMiddleware::default())
                .build(),
        );

        Ok(Self::new(client, base_url))
    }

    #[must_use]
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    fn subsystem_url(&self, nqn: &str) -> Result<Url, ApiError> {
        let mut url = self.url("api/nvmeof/subsystem/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(nqn);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, name: &'static str) -> RequestBuilder {
        debug!("{} {}", method, url);

        let request = self
            .client
            .request(method, url)
            .header(ACCEPT, API_VERSION)
            .with_extension(OtelName(name.into()));

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|body| body.detail)
            .unwrap_or(body);

        Err(ApiError::Status { status, detail })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Logs in and returns a client carrying the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(Self, Session), ApiError> {
        let url = self.url("api/auth")?;
        let request = self
            .request(Method::POST, url, "login")
            .json(&LoginRequest { username, password });

        let session: Session = Self::decode(Self::send(request).await?).await?;
        debug!("Logged in as {}", session.username);

        Ok((self.clone().with_token(session.token.clone()), session))
    }
}

#[async_trait]
impl NvmeofApi for DashboardClient {
    async fn list_subsystems(&self) -> Result<Vec<Subsystem>, ApiError> {
        let url = self.url("api/nvmeof/subsystem")?;
        let response = Self::send(self.request(Method::GET, url, "list_subsystems")).await?;
        Self::decode(response).await
    }

    async fn get_subsystem(&self, nqn: &str) -> Result<Subsystem, ApiError> {
        let url = self.subsystem_url(nqn)?;
        let response = Self::send(self.request(Method::GET, url, "get_subsystem")).await?;
        Self::decode(response).await
    }

    async fn is_subsystem_present(&self, nqn: &str) -> Result<bool, ApiError> {
        match self.get_subsystem(nqn).await {
            Ok(_) => Ok(true),
            Err(err) => {
                debug!("Treating subsystem {} as absent: {}", nqn, err);
                Ok(false)
            }
        }
    }

    async fn create_subsystem(
        &self,
        request: &CreateSubsystemRequest,
    ) -> Result<CallOutcome, ApiError> {
        let url = self.url("api/nvmeof/subsystem")?;
        let response =
            Self::send(self.request(Method::POST, url, "create_subsystem").json(request)).await?;

        if response.status() == StatusCode::ACCEPTED {
            Ok(CallOutcome::Accepted)
        } else {
            Ok(CallOutcome::Finished)
        }
    }
}

#[async_trait]
impl TaskApi for DashboardClient {
    async fn tasks(&self, name: &str) -> Result<TaskList, ApiError> {
        let url = self.url("api/task")?;
        let request = self
            .request(Method::GET, url, "list_tasks")
            .query(&[("name", name)]);
        Self::decode(Self::send(request).await?).await
    }
}
