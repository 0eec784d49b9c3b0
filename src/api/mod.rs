use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Proxy, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{BillingNotice, NoticeRequest, StudentPayload, StudentRecord};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } if !body.trim().is_empty() => Some(body.as_str()),
            _ => None,
        }
    }

    /// Server text verbatim for application failures, `fallback` for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}

/// The remote source of truth. Implemented over HTTP by [`HttpBackend`];
/// tests substitute an in-memory fake.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, ApiError>;

    async fn get_student(&self, registration_code: &str) -> Result<StudentRecord, ApiError>;

    async fn create_student(&self, payload: &StudentPayload) -> Result<(), ApiError>;

    async fn update_student(
        &self,
        registration_code: &str,
        payload: &StudentPayload,
    ) -> Result<(), ApiError>;

    async fn deactivate_student(&self, registration_code: &str) -> Result<(), ApiError>;

    async fn list_notices(&self) -> Result<Vec<BillingNotice>, ApiError>;

    async fn create_notice(&self, request: &NoticeRequest) -> Result<BillingNotice, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, options: &HttpOptions) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim()).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy_cfg = Proxy::all(proxy).map_err(|source| ApiError::ProxySetup {
                proxy: proxy.to_string(),
                source,
            })?;
            builder = builder.proxy(proxy_cfg);
        }
        let client = builder
            .build()
            .map_err(|source| ApiError::HttpClientBuild { source })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // joins path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|source| {
            tracing::error!(error = %source, "request could not be completed");
            ApiError::Transport { source }
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { source })?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        tracing::debug!(%method, %url, "sending request");
        self.client.request(method, url)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| {
        tracing::error!(error = %source, "response body could not be decoded");
        ApiError::Decode { source }
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, ApiError> {
        let url = self.endpoint(&["alunos"])?;
        let body = self.send(self.request(Method::GET, url)).await?;
        decode(&body)
    }

    async fn get_student(&self, registration_code: &str) -> Result<StudentRecord, ApiError> {
        let url = self.endpoint(&["alunos", "ra", registration_code])?;
        let body = self.send(self.request(Method::GET, url)).await?;
        decode(&body)
    }

    async fn create_student(&self, payload: &StudentPayload) -> Result<(), ApiError> {
        let url = self.endpoint(&["alunos"])?;
        self.send(self.request(Method::POST, url).json(payload))
            .await?;
        Ok(())
    }

    async fn update_student(
        &self,
        registration_code: &str,
        payload: &StudentPayload,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["alunos", "ra", registration_code])?;
        self.send(self.request(Method::PUT, url).json(payload))
            .await?;
        Ok(())
    }

    async fn deactivate_student(&self, registration_code: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["alunos", "ra", registration_code])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn list_notices(&self) -> Result<Vec<BillingNotice>, ApiError> {
        let url = self.endpoint(&["cobrancas"])?;
        let body = self.send(self.request(Method::GET, url)).await?;
        decode(&body)
    }

    async fn create_notice(&self, request: &NoticeRequest) -> Result<BillingNotice, ApiError> {
        let url = self.endpoint(&["cobrancas"])?;
        let body = self
            .send(self.request(Method::POST, url).query(request))
            .await?;
        decode(&body)
    }
}
