//! Remote publisher: create-or-update of one file through a [`ContentApi`].
//!
//! The remote API only accepts an overwrite when it carries the current
//! version marker (`sha`) of the file, so every publish starts with a fresh
//! metadata fetch.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::fmt;
use tracing::{error, info};

use crate::config::{Committer, RemoteTarget};
use crate::contract::{ContentApi, Credential, PutContentsBody};
use crate::update::UpdateError;

/// Result of a write that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// 200 (updated) or 201 (created).
    Published { status: u16 },
    /// Any other status; `body` is the server's response verbatim.
    Rejected { status: u16, body: String },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Published { status } => {
                write!(f, "remote file updated (status {status})")
            }
            PublishOutcome::Rejected { status, body } => {
                write!(f, "remote update failed with status {status}: {body}")
            }
        }
    }
}

#[derive(Deserialize)]
struct ContentsMetadata {
    sha: Option<String>,
}

/// Current version marker of the remote file, or `None` if it does not exist yet.
pub async fn current_version_marker<A>(
    api: &A,
    target: &RemoteTarget,
    credential: &Credential,
) -> Result<Option<String>, UpdateError>
where
    A: ContentApi + ?Sized,
{
    let resp = api
        .get_contents(target, credential)
        .await
        .map_err(UpdateError::Transport)?;
    match resp.status {
        200 => {
            let meta: ContentsMetadata = serde_json::from_str(&resp.body).map_err(|e| {
                error!(error = ?e, "Remote metadata is not valid JSON");
                UpdateError::RemoteFetch {
                    status: resp.status,
                    body: resp.body.clone(),
                }
            })?;
            info!(sha = ?meta.sha, "Remote file exists");
            Ok(meta.sha)
        }
        404 => {
            info!(path = %target.path, "Remote file does not exist yet");
            Ok(None)
        }
        status => {
            error!(status, body = %resp.body, "Unexpected status fetching remote file");
            Err(UpdateError::RemoteFetch {
                status,
                body: resp.body,
            })
        }
    }
}

/// Builds the write body; `sha` is included only when the file already exists.
pub fn build_put_body(
    content: &[u8],
    message: &str,
    committer: &Committer,
    sha: Option<String>,
) -> PutContentsBody {
    PutContentsBody {
        message: message.to_string(),
        content: STANDARD.encode(content),
        committer: committer.clone(),
        sha,
    }
}

/// Creates or overwrites the remote file with `content`.
///
/// A fetch failure is an error. A write the server refuses is reported as
/// [`PublishOutcome::Rejected`].
pub async fn publish<A>(
    api: &A,
    target: &RemoteTarget,
    content: &[u8],
    message: &str,
    committer: &Committer,
    credential: &Credential,
) -> Result<PublishOutcome, UpdateError>
where
    A: ContentApi + ?Sized,
{
    let sha = current_version_marker(api, target, credential).await?;
    let body = build_put_body(content, message, committer, sha);
    let resp = api
        .put_contents(target, &body, credential)
        .await
        .map_err(UpdateError::Transport)?;

    let outcome = match resp.status {
        200 | 201 => PublishOutcome::Published {
            status: resp.status,
        },
        status => PublishOutcome::Rejected {
            status,
            body: resp.body,
        },
    };
    if outcome.is_success() {
        info!(%outcome, "[PUBLISH] Remote manifest written");
    } else {
        error!(%outcome, "[PUBLISH][ERROR] Remote manifest write rejected");
    }
    Ok(outcome)
}
