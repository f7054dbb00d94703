//! Publisher selection from environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use super::s3::{DEFAULT_REGION, DEFAULT_TEMPLATE_BUCKET};
use super::{
    AzureConfig, AzurePublisher, FsPublisher, GitHubPublisher, MemoryPublisher, Publisher,
    S3Config, S3Publisher,
};
use crate::ai::ConfigError;

pub const DEFAULT_STORAGE_ROOT: &str = "data/sites";
pub const DEFAULT_TEMPLATE_DIR: &str = "template";
pub const DEFAULT_GITHUB_BRANCH: &str = "main";
pub const DEFAULT_AZURE_RESOURCE_GROUP: &str = "recipe-generator";
pub const DEFAULT_AZURE_LOCATION: &str = "westeurope";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherConfig {
    Filesystem {
        root: PathBuf,
        template_dir: PathBuf,
    },
    Memory,
    Azure(AzureConfig),
    S3(S3Config),
    GitHub {
        token: String,
        repository: String,
        branch: String,
    },
}

impl PublisherConfig {
    /// Load configuration from environment variables.
    ///
    /// - `STORAGE_BACKEND`: "filesystem" (default), "memory", "azure", "s3" or "github"
    /// - `STORAGE_ROOT`, `STORAGE_TEMPLATE_DIR`: filesystem backend
    /// - `AZURE_STORAGE_TOKEN`, `AZURE_MANAGEMENT_TOKEN`, `AZURE_SUBSCRIPTION_ID`,
    ///   `AZURE_TEMPLATE_ACCOUNT`, `AZURE_RESOURCE_GROUP`, `AZURE_LOCATION`,
    ///   `AZURE_OBJECT_ID`: azure backend
    /// - `S3_ENDPOINT`, `S3_ACCESS`, `S3_SECRET`, `S3_REGION`, `S3_TEMPLATE_BUCKET`: s3 backend
    /// - `GITHUB_TOKEN`, `GITHUB_REPOSITORY`, `GITHUB_BRANCH`: github backend
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("filesystem") => Ok(PublisherConfig::Filesystem {
                root: lookup("STORAGE_ROOT")
                    .unwrap_or_else(|| DEFAULT_STORAGE_ROOT.to_string())
                    .into(),
                template_dir: lookup("STORAGE_TEMPLATE_DIR")
                    .unwrap_or_else(|| DEFAULT_TEMPLATE_DIR.to_string())
                    .into(),
            }),
            Some("memory") => Ok(PublisherConfig::Memory),
            Some("azure") => Ok(PublisherConfig::Azure(AzureConfig {
                storage_token: required("AZURE_STORAGE_TOKEN")?,
                management_token: required("AZURE_MANAGEMENT_TOKEN")?,
                subscription_id: required("AZURE_SUBSCRIPTION_ID")?,
                resource_group: optional("AZURE_RESOURCE_GROUP", DEFAULT_AZURE_RESOURCE_GROUP),
                location: optional("AZURE_LOCATION", DEFAULT_AZURE_LOCATION),
                template_account: required("AZURE_TEMPLATE_ACCOUNT")?,
                principal_id: lookup("AZURE_OBJECT_ID").filter(|v| !v.is_empty()),
            })),
            Some("s3") => {
                let endpoint = required("S3_ENDPOINT")?;
                // Bare host:port means a plain-HTTP MinIO.
                let endpoint = if endpoint.contains("://") {
                    endpoint
                } else {
                    format!("http://{endpoint}")
                };
                Ok(PublisherConfig::S3(S3Config {
                    endpoint,
                    region: optional("S3_REGION", DEFAULT_REGION),
                    access_key: required("S3_ACCESS")?,
                    secret_key: required("S3_SECRET")?,
                    template_bucket: optional("S3_TEMPLATE_BUCKET", DEFAULT_TEMPLATE_BUCKET),
                }))
            }
            Some("github") => {
                let repository = required("GITHUB_REPOSITORY")?;
                if repository.split('/').count() != 2 {
                    return Err(ConfigError::InvalidValue {
                        name: "GITHUB_REPOSITORY".to_string(),
                        value: repository,
                    });
                }
                Ok(PublisherConfig::GitHub {
                    token: required("GITHUB_TOKEN")?,
                    repository,
                    branch: lookup("GITHUB_BRANCH")
                        .unwrap_or_else(|| DEFAULT_GITHUB_BRANCH.to_string()),
                })
            }
            Some(other) => Err(ConfigError::InvalidValue {
                name: "STORAGE_BACKEND".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Build the configured publisher. The filesystem backend refuses to start
/// unless its template directory holds every template file.
pub fn create_publisher(config: PublisherConfig) -> Result<Arc<dyn Publisher>, ConfigError> {
    let publisher: Arc<dyn Publisher> = match config {
        PublisherConfig::Filesystem { root, template_dir } => {
            tracing::info!(root = %root.display(), template_dir = %template_dir.display(), "Publishing to filesystem");
            let publisher = FsPublisher::open(root, &template_dir).map_err(|e| {
                ConfigError::InvalidValue {
                    name: "STORAGE_TEMPLATE_DIR".to_string(),
                    value: format!("{} ({e})", template_dir.display()),
                }
            })?;
            Arc::new(publisher)
        }
        PublisherConfig::Memory => {
            tracing::warn!("Publishing to memory; sites are lost on restart");
            Arc::new(MemoryPublisher::new())
        }
        PublisherConfig::Azure(config) => {
            tracing::info!(
                template_account = %config.template_account,
                resource_group = %config.resource_group,
                location = %config.location,
                "Publishing to Azure Blob Storage"
            );
            Arc::new(AzurePublisher::new(config))
        }
        PublisherConfig::S3(config) => {
            tracing::info!(endpoint = %config.endpoint, region = %config.region, "Publishing to S3");
            let endpoint = config.endpoint.clone();
            let publisher = S3Publisher::new(config).map_err(|_| ConfigError::InvalidValue {
                name: "S3_ENDPOINT".to_string(),
                value: endpoint,
            })?;
            Arc::new(publisher)
        }
        PublisherConfig::GitHub {
            token,
            repository,
            branch,
        } => {
            tracing::info!(repository = %repository, branch = %branch, "Publishing to GitHub");
            Arc::new(GitHubPublisher::new(token, repository, branch))
        }
    };
    Ok(publisher)
}

pub fn create_publisher_from_env() -> Result<Arc<dyn Publisher>, ConfigError> {
    create_publisher(PublisherConfig::from_env()?)
}
