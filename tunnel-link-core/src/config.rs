use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REMOTE_PATH: &str = "manifest.json";
pub const DEFAULT_LOG_FILE: &str = "tunnel.log";
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_TUNNEL_ORIGIN: &str = "http://localhost:3000";

/// Where the manifest lives on the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTarget {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl RemoteTarget {
    /// `{owner}/{repo}/contents/{path}` relative to the `repos` collection.
    pub fn contents_path(&self) -> String {
        format!(
            "repos/{}/{}/contents/{}",
            self.owner,
            self.repo,
            self.path.trim_start_matches('/')
        )
    }
}

/// Identity recorded as committer on every remote write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

impl Default for Committer {
    fn default() -> Self {
        Self {
            name: "automation-bot".to_string(),
            email: "bot+automation@local".to_string(),
        }
    }
}

/// Whether a freshly prompted credential is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistPolicy {
    /// Ask the user, defaulting to yes.
    #[default]
    Ask,
    Always,
    Never,
}

/// Everything one run of the updater needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub target: RemoteTarget,
    pub api_url: String,
    pub log_file: PathBuf,
    pub manifest_file: PathBuf,
    pub credential_file: PathBuf,
    /// Local origin the tunnel forwards to; only used in guidance messages.
    pub tunnel_origin: String,
    pub committer: Committer,
    pub persist_credential: PersistPolicy,
}

impl UpdateConfig {
    pub fn trace_loaded(&self) {
        info!(
            owner = %self.target.owner,
            repo = %self.target.repo,
            remote_path = %self.target.path,
            log_file = %self.log_file.display(),
            manifest_file = %self.manifest_file.display(),
            "Loaded UpdateConfig"
        );
        debug!(?self, "UpdateConfig loaded (full debug)");
    }
}
