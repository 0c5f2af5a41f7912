//! # GitHub contents API client
//!
//! Implements [`ContentApi`] over `reqwest` against
//! `{api_url}/repos/{owner}/{repo}/contents/{path}`.
//!
//! The client only transports: it sends the request, reads the status and the
//! body as text, and hands both back. Any response, including 4xx and 5xx, is
//! `Ok`; only failures to get a response at all are errors.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::config::RemoteTarget;
use crate::contract::{ApiResponse, ContentApi, Credential, PutContentsBody, TransportError};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("tunnel-link/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();
        tracing::info!(api_url = %api_url, "Initialized GitHubClient");
        Ok(Self { http, api_url })
    }

    pub fn contents_url(&self, target: &RemoteTarget) -> String {
        format!("{}/{}", self.api_url, target.contents_path())
    }

    async fn into_api_response(resp: reqwest::Response) -> Result<ApiResponse, TransportError> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl ContentApi for GitHubClient {
    async fn get_contents(
        &self,
        target: &RemoteTarget,
        credential: &Credential,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.contents_url(target);
        tracing::info!(url = %url, "Fetching remote file metadata");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "GET contents failed to complete");
                e
            })?;
        Self::into_api_response(resp).await
    }

    async fn put_contents(
        &self,
        target: &RemoteTarget,
        body: &PutContentsBody,
        credential: &Credential,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.contents_url(target);
        tracing::info!(url = %url, has_sha = body.sha.is_some(), "Writing remote file");
        let resp = self
            .http
            .put(&url)
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "PUT contents failed to complete");
                e
            })?;
        Self::into_api_response(resp).await
    }
}
