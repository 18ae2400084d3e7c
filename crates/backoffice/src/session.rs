//! Bearer token storage.
//!
//! Signing in happens elsewhere; this module only hands out whatever token
//! the session currently holds. The gateway asks before every call.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub trait TokenSource: Send + Sync {
    /// Current bearer token, `None` when the operator is signed out.
    fn bearer_token(&self) -> Option<String>;
}

/// Token fixed at startup (config file or environment).
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone().filter(|token| !token.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    token: Option<String>,
}

/// JSON session file, re-read on every lookup so a token refreshed by
/// another process is picked up without restarting.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<SessionData> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(SessionData::default());
            }
            Err(err) => return Err(err),
        };
        serde_json::from_str(&content).map_err(io::Error::other)
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = SessionData {
            token: Some(token.trim().to_string()),
        };
        let payload = serde_json::to_string_pretty(&data).map_err(io::Error::other)?;
        fs::write(&self.path, payload)
    }
}

impl TokenSource for SessionFile {
    fn bearer_token(&self) -> Option<String> {
        match self.load() {
            Ok(data) => data.token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                tracing::warn!("session file {} unreadable: {err}", self.path.display());
                None
            }
        }
    }
}

/// First source that yields a token wins.
pub struct ChainedTokens(pub Vec<Box<dyn TokenSource>>);

impl TokenSource for ChainedTokens {
    fn bearer_token(&self) -> Option<String> {
        self.0.iter().find_map(|source| source.bearer_token())
    }
}
