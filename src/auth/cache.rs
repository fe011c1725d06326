// Token cache store
// One JSON file per endpoint identity under a per-user directory

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::types::{EndpointIdentity, SessionToken};
use crate::error::Result;

const FILE_PREFIX: &str = "token_";
const FILE_SUFFIX: &str = ".json";

/// File-backed token cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file path for an identity
    pub fn path_for(&self, identity: &EndpointIdentity) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, identity.cache_key(), FILE_SUFFIX))
    }

    /// Load the cached token. A missing or unreadable-as-JSON file is `None`.
    pub fn load(&self, identity: &EndpointIdentity) -> Result<Option<SessionToken>> {
        let path = self.path_for(identity);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<SessionToken>(&data) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring corrupt token cache file");
                Ok(None)
            }
        }
    }

    /// Persist a token, readable by the owning user only
    pub fn save(&self, identity: &EndpointIdentity, token: &SessionToken) -> Result<()> {
        self.ensure_dir()?;

        let path = self.path_for(identity);
        let data = serde_json::to_vec(token)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        file.write_all(&data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "Saved token cache");
        Ok(())
    }

    /// Remove the cached token for one identity. Idempotent.
    pub fn clear(&self, identity: &EndpointIdentity) -> Result<()> {
        let path = self.path_for(identity);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed token cache");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}
