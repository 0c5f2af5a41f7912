//! Credential store: one secret string in one file, readable only by its owner.
//!
//! Obtaining a credential is split in two so callers decide about prompting:
//! [`CredentialStore::obtain`] reports either a stored credential or
//! [`Obtained::NeedsPrompt`], and [`CredentialStore::prompt`] runs the
//! interactive step through an injected [`Prompter`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::PersistPolicy;
use crate::contract::{Credential, Prompter};
use crate::update::UpdateError;

/// Result of looking for a credential without asking anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obtained {
    Stored(Credential),
    NeedsPrompt,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored secret, or `None` when the file is missing or blank.
    pub fn read(&self) -> io::Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Credential::new(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!(error = ?e, path = %self.path.display(), "Failed to read credential file");
                Err(e)
            }
        }
    }

    pub fn obtain(&self) -> io::Result<Obtained> {
        Ok(match self.read()? {
            Some(credential) => {
                info!(path = %self.path.display(), "Using stored credential");
                Obtained::Stored(credential)
            }
            None => Obtained::NeedsPrompt,
        })
    }

    /// Writes `credential` as the whole file and restricts it to the owner.
    pub fn save(&self, credential: &Credential) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_owner_only(&self.path, credential.expose().as_bytes())?;
        info!(path = %self.path.display(), "Credential saved (mode 600)");
        Ok(())
    }

    /// Asks for a secret; an empty answer is fatal. Persists it according to `policy`.
    pub fn prompt<P>(
        &self,
        prompter: &P,
        policy: PersistPolicy,
        guidance: &str,
    ) -> Result<Credential, UpdateError>
    where
        P: Prompter + ?Sized,
    {
        let raw = prompter.secret(guidance).map_err(UpdateError::Prompt)?;
        let credential = match Credential::new(raw) {
            Some(c) => c,
            None => {
                warn!("No credential entered");
                return Err(UpdateError::MissingCredential);
            }
        };

        let persist = match policy {
            PersistPolicy::Always => true,
            PersistPolicy::Never => false,
            PersistPolicy::Ask => prompter
                .confirm("Save the token locally for future runs?", true)
                .map_err(UpdateError::Prompt)?,
        };
        if persist {
            self.save(&credential).map_err(UpdateError::Credential)?;
        }
        Ok(credential)
    }
}

/// New files are created with mode 600; an existing file is narrowed to 600 before writing.
#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}
