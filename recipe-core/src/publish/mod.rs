//! Publishing of recipe sites: one Markdown file per recipe plus a
//! categorized index, written to a per-user storage account.
//!
//! Backends:
//! - `filesystem`: `<root>/<account>/<path>` on local disk
//! - `memory`: in-process map, for tests and local runs
//! - `azure`: Azure Blob `$web` container of a storage account created per user
//! - `s3`: one public-read bucket per account on S3 or MinIO
//! - `github`: one repository, `<account>/<path>`, one commit per write

mod azure;
mod bootstrap;
mod config;
mod fs;
mod github;
mod index;
mod memory;
mod s3;
mod site;

use async_trait::async_trait;
use thiserror::Error;

pub use azure::{AzureConfig, AzurePublisher};
pub use bootstrap::{bootstrap_site, RetryPolicy, TEMPLATE_FILES};
pub use config::{create_publisher, create_publisher_from_env, PublisherConfig};
pub use fs::FsPublisher;
pub use github::GitHubPublisher;
pub use index::{recipe_path, recipe_slug, render_index, INDEX_PATH};
pub use memory::MemoryPublisher;
pub use s3::{S3Config, S3Publisher};
pub use site::{publish_index, publish_recipe, SiteError};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Template file not found: {0}")]
    TemplateMissing(String),

    #[error("Storage account name not available: {0}")]
    AccountUnavailable(String),
}

impl PublishError {
    /// Whether another attempt at the same operation could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            PublishError::InvalidPath(_)
                | PublishError::TemplateMissing(_)
                | PublishError::AccountUnavailable(_)
        )
    }
}

/// Object storage for published sites.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Write `content` to `path` inside `account`, replacing any existing object.
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError>;

    /// Copy a site template file into `account` under the same path.
    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError>;

    /// Create the storage behind `account` and make it publicly readable.
    /// Backends whose accounts are plain prefixes have nothing to do.
    async fn provision(&self, _account: &str) -> Result<(), PublishError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}

pub(crate) fn check_account(account: &str) -> Result<(), PublishError> {
    if account.is_empty() || !account.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PublishError::InvalidPath(format!("account {account:?}")));
    }
    Ok(())
}

/// Reject account names and object paths that could escape their account.
pub(crate) fn check_path(account: &str, path: &str) -> Result<(), PublishError> {
    check_account(account)?;
    let bad_segment = path
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if path.is_empty() || path.contains('\\') || bad_segment {
        return Err(PublishError::InvalidPath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("md") => "text/markdown; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        _ => "application/octet-stream",
    }
}
