//! Derives the filesystem artefacts shared by the worker and its host.
//!
//! The file-exchange transport and the health timer both write next to the
//! host, so both sides need to agree on the layout. Requests are published by
//! renaming a `.tmp` file into place; the worker only ever reads the final
//! name.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;

/// File name of the request artefact inside the exchange directory.
pub const REQUEST_FILE: &str = "request.json";

/// File name of the response artefact inside the exchange directory.
pub const RESPONSE_FILE: &str = "response.json";

/// Canonical paths for artefacts written or consumed by the worker.
#[derive(Debug, Clone)]
pub struct ExchangePaths {
    exchange_dir: PathBuf,
    request_path: PathBuf,
    response_path: PathBuf,
    health_path: PathBuf,
}

impl ExchangePaths {
    /// Derives the artefact paths from the shared configuration without
    /// touching the filesystem.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let exchange_dir = config.exchange_dir().as_std_path().to_path_buf();
        Self {
            request_path: exchange_dir.join(REQUEST_FILE),
            response_path: exchange_dir.join(RESPONSE_FILE),
            health_path: config.health_path().as_std_path().to_path_buf(),
            exchange_dir,
        }
    }

    /// Creates the exchange directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangePathsError::Directory`] when the directory cannot be
    /// created.
    pub fn prepare_exchange(&self) -> Result<(), ExchangePathsError> {
        create_dir(&self.exchange_dir)
    }

    /// Creates the parent directory of the health artefact, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangePathsError::Directory`] when the directory cannot be
    /// created.
    pub fn prepare_health(&self) -> Result<(), ExchangePathsError> {
        self.health_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or(Ok(()), create_dir)
    }

    /// Directory polled by the file-exchange transport.
    #[must_use]
    pub fn exchange_dir(&self) -> &Path {
        self.exchange_dir.as_path()
    }

    /// Path of the request artefact.
    #[must_use]
    pub fn request_path(&self) -> &Path {
        self.request_path.as_path()
    }

    /// Path of the response artefact.
    #[must_use]
    pub fn response_path(&self) -> &Path {
        self.response_path.as_path()
    }

    /// Path of the health snapshot.
    #[must_use]
    pub fn health_path(&self) -> &Path {
        self.health_path.as_path()
    }
}

fn create_dir(path: &Path) -> Result<(), ExchangePathsError> {
    fs::create_dir_all(path).map_err(|source| ExchangePathsError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors raised while preparing worker artefact paths.
#[derive(Debug, Error)]
pub enum ExchangePathsError {
    /// Creating a directory failed.
    #[error("failed to prepare directory '{path}': {source}")]
    Directory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
