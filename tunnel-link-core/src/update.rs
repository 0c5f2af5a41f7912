//! High-level pipeline: credential → tunnel log → local manifest → remote manifest.
//!
//! [`update_link`] runs the steps strictly in order and stops at the first
//! fatal one:
//!   - obtain a credential (environment, stored file, or prompt)
//!   - find the current tunnel URL in the log
//!   - set `app_url` in the local manifest and save it
//!   - publish the same bytes to the remote repository
//!
//! A remote write the server refuses is not an error here: it is returned in
//! [`UpdateReport::outcome`] and the local manifest keeps the new URL.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::UpdateConfig;
use crate::contract::{ContentApi, Credential, Prompter, TransportError};
use crate::credential::{CredentialStore, Obtained};
use crate::manifest;
use crate::publish::{self, PublishOutcome};
use crate::scanner;

#[derive(Debug)]
pub enum UpdateError {
    /// The user supplied no credential.
    MissingCredential,
    /// No tunnel URL in the log (or no log at all).
    MissingTunnelUrl { log_file: PathBuf, guidance: String },
    InvalidLocalManifestJson(String),
    /// Fetching the version marker returned something other than 200 or 404.
    RemoteFetch { status: u16, body: String },
    Credential(std::io::Error),
    Manifest(std::io::Error),
    Log(std::io::Error),
    Prompt(std::io::Error),
    Transport(TransportError),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::MissingCredential => write!(f, "no token provided, aborting"),
            UpdateError::MissingTunnelUrl { log_file, guidance } => write!(
                f,
                "tunnel URL not found in {}\n{guidance}",
                log_file.display()
            ),
            UpdateError::InvalidLocalManifestJson(detail) => {
                write!(f, "local manifest is not a valid JSON object: {detail}")
            }
            UpdateError::RemoteFetch { status, body } => {
                write!(f, "error fetching remote file: {status} {body}")
            }
            UpdateError::Credential(e) => write!(f, "credential file error: {e}"),
            UpdateError::Manifest(e) => write!(f, "local manifest error: {e}"),
            UpdateError::Log(e) => write!(f, "could not read tunnel log: {e}"),
            UpdateError::Prompt(e) => write!(f, "could not read from terminal: {e}"),
            UpdateError::Transport(e) => write!(f, "request failed: {e}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdateError::Credential(e)
            | UpdateError::Manifest(e)
            | UpdateError::Log(e)
            | UpdateError::Prompt(e) => Some(e),
            UpdateError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Milestones reported while a run is in progress, before the remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    UrlDetected(&'a str),
    LocalManifestSaved(&'a Path),
}

/// What a completed run did.
#[derive(Debug)]
pub struct UpdateReport {
    pub url: String,
    pub manifest_path: PathBuf,
    pub outcome: PublishOutcome,
}

/// Text shown before asking for a token.
pub fn credential_guidance(config: &UpdateConfig) -> String {
    format!(
        "A GitHub personal access token with 'Contents: Read & Write' permission is required for:\n  \
         https://github.com/{}/{}\n\
         Create one at https://github.com/settings/tokens (fine-grained token recommended).",
        config.target.owner, config.target.repo
    )
}

/// How to start a tunnel that writes to the configured log file.
pub fn tunnel_guidance(config: &UpdateConfig) -> String {
    format!(
        "Make sure the tunnel is running, e.g.:\n  cloudflared tunnel --url {} > {} 2>&1 &",
        config.tunnel_origin,
        config.log_file.display()
    )
}

pub fn commit_message(url: &str) -> String {
    format!("Update app_url to {url}")
}

/// Resolves the credential: `preset` first, then the store, then the prompter.
pub fn obtain_credential<P>(
    config: &UpdateConfig,
    preset: Option<Credential>,
    prompter: &P,
) -> Result<Credential, UpdateError>
where
    P: Prompter + ?Sized,
{
    if let Some(credential) = preset {
        info!("Using credential supplied by the environment");
        return Ok(credential);
    }
    let store = CredentialStore::new(&config.credential_file);
    match store.obtain().map_err(UpdateError::Credential)? {
        Obtained::Stored(credential) => Ok(credential),
        Obtained::NeedsPrompt => store.prompt(
            prompter,
            config.persist_credential,
            &credential_guidance(config),
        ),
    }
}

/// Runs one full update. `preset` is a credential that bypasses the store;
/// `progress` sees each local step as soon as it completes.
pub async fn update_link<A, P, F>(
    config: &UpdateConfig,
    api: &A,
    prompter: &P,
    preset: Option<Credential>,
    mut progress: F,
) -> Result<UpdateReport, UpdateError>
where
    A: ContentApi + ?Sized,
    P: Prompter + ?Sized,
    F: FnMut(Progress<'_>),
{
    info!("[UPDATE] Starting tunnel link update");

    let credential = obtain_credential(config, preset, prompter).map_err(|e| {
        error!(error = %e, "[UPDATE][ERROR] Could not obtain credential");
        e
    })?;

    let url = match scanner::extract_url(&config.log_file).map_err(UpdateError::Log)? {
        Some(url) => url,
        None => {
            error!(log_file = %config.log_file.display(), "[UPDATE][ERROR] Tunnel URL not found");
            return Err(UpdateError::MissingTunnelUrl {
                log_file: config.log_file.clone(),
                guidance: tunnel_guidance(config),
            });
        }
    };
    info!(url = %url, "[UPDATE] Tunnel URL detected");
    progress(Progress::UrlDetected(&url));

    let mut local = manifest::load(&config.manifest_file)?;
    manifest::set_app_url(&mut local, &url);
    let content = manifest::save(&config.manifest_file, &local)?;
    progress(Progress::LocalManifestSaved(&config.manifest_file));

    let outcome = publish::publish(
        api,
        &config.target,
        &content,
        &commit_message(&url),
        &config.committer,
        &credential,
    )
    .await?;

    info!(success = outcome.is_success(), "[UPDATE] Finished");
    Ok(UpdateReport {
        url,
        manifest_path: config.manifest_file.clone(),
        outcome,
    })
}
