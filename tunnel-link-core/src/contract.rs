//! # contract: the seams between tunnel-link's logic and the outside world
//!
//! Two traits live here:
//! - [`ContentApi`]: read and write a file through a hosted repository's
//!   contents endpoint. Implemented by [`crate::github::GitHubClient`].
//! - [`Prompter`]: ask the user for a secret and for a yes/no answer.
//!   Implemented by the CLI on top of a terminal.
//!
//! Both are annotated for `mockall`, so tests can drive the orchestrator with
//! no network and no terminal.
//!
//! `ContentApi` deliberately returns the raw status and body. Deciding what a
//! status means (found, missing, rejected) is the job of [`crate::publish`].

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use std::fmt;

use crate::config::{Committer, RemoteTarget};

/// Error raised when a request never produced an HTTP response.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Secret used to authenticate against the contents API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims surrounding whitespace; returns `None` when nothing is left.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Body of a create-or-update write.
///
/// `sha` is present when overwriting an existing file and absent when creating one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContentsBody {
    pub message: String,
    /// Base64 of the new file content.
    pub content: String,
    pub committer: Committer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Access to a single file in a hosted repository.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch the metadata of the file at `target`.
    async fn get_contents(
        &self,
        target: &RemoteTarget,
        credential: &Credential,
    ) -> Result<ApiResponse, TransportError>;

    /// Create or overwrite the file at `target`.
    async fn put_contents(
        &self,
        target: &RemoteTarget,
        body: &PutContentsBody,
        credential: &Credential,
    ) -> Result<ApiResponse, TransportError>;
}

/// Interactive questions asked while obtaining a credential.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Prompter {
    /// Show `guidance`, then read a secret without echoing it.
    fn secret(&self, guidance: &str) -> std::io::Result<String>;

    /// Ask a yes/no question.
    fn confirm(&self, question: &str, default: bool) -> std::io::Result<bool>;
}
