/// `load_config` module: builds the [`UpdateConfig`] for a run from defaults, an
/// optional YAML file and the environment.
///
/// # Precedence
/// Built-in defaults < YAML file < environment variables. A `.env` file in the
/// working directory is loaded into the environment first.
///
/// # Errors
/// All errors use `anyhow::Error`: a config file that cannot be read or
/// parsed, a missing owner or repo, or no per-user config directory to put the
/// credential file in.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tunnel_link_core::config::{
    Committer, PersistPolicy, RemoteTarget, UpdateConfig, DEFAULT_API_URL, DEFAULT_LOG_FILE,
    DEFAULT_MANIFEST_FILE, DEFAULT_REMOTE_PATH, DEFAULT_TUNNEL_ORIGIN,
};
use tunnel_link_core::contract::Credential;

pub const ENV_OWNER: &str = "TUNNEL_LINK_OWNER";
pub const ENV_REPO: &str = "TUNNEL_LINK_REPO";
pub const ENV_REMOTE_PATH: &str = "TUNNEL_LINK_REMOTE_PATH";
pub const ENV_LOG_FILE: &str = "TUNNEL_LINK_LOG_FILE";
pub const ENV_MANIFEST_FILE: &str = "TUNNEL_LINK_MANIFEST_FILE";
pub const ENV_CREDENTIAL_FILE: &str = "TUNNEL_LINK_CREDENTIAL_FILE";
pub const ENV_API_URL: &str = "TUNNEL_LINK_API_URL";
pub const ENV_ORIGIN: &str = "TUNNEL_LINK_ORIGIN";
pub const ENV_TOKEN: &str = "TUNNEL_LINK_TOKEN";

/// Shape of the YAML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub remote_path: Option<String>,
    pub log_file: Option<PathBuf>,
    pub manifest_file: Option<PathBuf>,
    pub credential_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub tunnel_origin: Option<String>,
    pub committer: Option<Committer>,
    pub persist_credential: Option<PersistPolicy>,
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        anyhow!("Failed to read config file {:?}: {}", path, e)
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
        anyhow!("Failed to parse config YAML: {e}")
    })
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `<config dir>/tunnel-link/gh_token`.
pub fn default_credential_file() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not find the user config directory")?;
    Ok(base.join("tunnel-link").join("gh_token"))
}

/// Loads the run configuration. `path` is the optional YAML file.
pub fn load_config(path: Option<&Path>) -> Result<UpdateConfig> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(p) => read_file_config(p)?,
        None => FileConfig::default(),
    };

    let owner = env_value(ENV_OWNER)
        .or(file.owner)
        .ok_or_else(|| anyhow!("Repository owner not configured (set `owner` or {ENV_OWNER})"))?;
    let repo = env_value(ENV_REPO)
        .or(file.repo)
        .ok_or_else(|| anyhow!("Repository name not configured (set `repo` or {ENV_REPO})"))?;

    let credential_file = match env_value(ENV_CREDENTIAL_FILE)
        .map(PathBuf::from)
        .or(file.credential_file)
    {
        Some(p) => p,
        None => default_credential_file()?,
    };

    let config = UpdateConfig {
        target: RemoteTarget {
            owner,
            repo,
            path: env_value(ENV_REMOTE_PATH)
                .or(file.remote_path)
                .unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_string()),
        },
        api_url: env_value(ENV_API_URL)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        log_file: env_value(ENV_LOG_FILE)
            .map(PathBuf::from)
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        manifest_file: env_value(ENV_MANIFEST_FILE)
            .map(PathBuf::from)
            .or(file.manifest_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_FILE)),
        credential_file,
        tunnel_origin: env_value(ENV_ORIGIN)
            .or(file.tunnel_origin)
            .unwrap_or_else(|| DEFAULT_TUNNEL_ORIGIN.to_string()),
        committer: file.committer.unwrap_or_default(),
        persist_credential: file.persist_credential.unwrap_or_default(),
    };
    config.trace_loaded();
    Ok(config)
}

/// Token from the environment; never written to disk.
pub fn env_credential() -> Option<Credential> {
    env::var(ENV_TOKEN).ok().and_then(Credential::new)
}
