//! Azure Blob Storage backend.
//!
//! Every account is its own StorageV2 storage account, created through
//! Azure Resource Manager on first login and serving its site from the
//! `$web` container. Template files are server-side copied from the
//! `template` container of a shared template account.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use super::bootstrap::RetryPolicy;
use super::{check_account, check_path, content_type_for, PublishError, Publisher};

const API_VERSION: &str = "2023-11-03";
const STORAGE_API_VERSION: &str = "2023-05-01";
const ROLE_API_VERSION: &str = "2022-04-01";
const SITE_CONTAINER: &str = "$web";
const TEMPLATE_CONTAINER: &str = "template";
const BLOB_ENDPOINT: &str = "https://{account}.blob.core.windows.net";
const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Storage Blob Data Contributor.
const BLOB_CONTRIBUTOR_ROLE: &str = "ba92f5b4-2d11-453d-a403-e96b0029c9fe";

const STATIC_WEBSITE_PROPERTIES: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    "<StorageServiceProperties><StaticWebsite>",
    "<Enabled>true</Enabled><IndexDocument>index.html</IndexDocument>",
    "</StaticWebsite></StorageServiceProperties>"
);

/// Credentials and placement for per-user storage accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConfig {
    /// Bearer token for the Blob service.
    pub storage_token: String,
    /// Bearer token for Azure Resource Manager.
    pub management_token: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub location: String,
    /// Account whose `template` container holds the site template.
    pub template_account: String,
    /// Principal granted blob write access on every new account, if set.
    pub principal_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct NameAvailabilityRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameAvailability {
    name_available: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct Sku {
    name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptionService {
    key_type: &'static str,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct EncryptionServices {
    blob: EncryptionService,
    file: EncryptionService,
    queue: EncryptionService,
    table: EncryptionService,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Encryption {
    services: EncryptionServices,
    key_source: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountProperties {
    access_tier: &'static str,
    encryption: Encryption,
}

#[derive(Debug, Serialize)]
struct CreateAccountRequest<'a> {
    kind: &'static str,
    sku: Sku,
    location: &'a str,
    properties: AccountProperties,
}

impl<'a> CreateAccountRequest<'a> {
    fn new(location: &'a str) -> Self {
        let service = || EncryptionService {
            key_type: "Account",
            enabled: true,
        };
        Self {
            kind: "StorageV2",
            sku: Sku {
                name: "Standard_LRS",
            },
            location,
            properties: AccountProperties {
                access_tier: "Cool",
                encryption: Encryption {
                    services: EncryptionServices {
                        blob: service(),
                        file: service(),
                        queue: service(),
                        table: service(),
                    },
                    key_source: "Microsoft.Storage",
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountState {
    #[serde(default)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    #[serde(default)]
    properties: Option<AccountState>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleAssignmentProperties {
    role_definition_id: String,
    principal_id: String,
}

#[derive(Debug, Serialize)]
struct RoleAssignmentRequest {
    properties: RoleAssignmentProperties,
}

pub struct AzurePublisher {
    client: reqwest::Client,
    config: AzureConfig,
    blob_endpoint: String,
    management_endpoint: String,
    creation_poll: RetryPolicy,
}

impl AzurePublisher {
    pub fn new(config: AzureConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            blob_endpoint: BLOB_ENDPOINT.to_string(),
            management_endpoint: MANAGEMENT_ENDPOINT.to_string(),
            creation_poll: RetryPolicy {
                max_attempts: 30,
                delay: Duration::from_secs(2),
            },
        }
    }

    fn service_url(&self, account: &str) -> Result<Url, PublishError> {
        Url::parse(&self.blob_endpoint.replace("{account}", account))
            .map_err(|e| PublishError::InvalidPath(e.to_string()))
    }

    fn blob_url(&self, account: &str, container: &str, path: &str) -> Result<Url, PublishError> {
        let mut url = self.service_url(account)?;
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidPath(account.to_string()))?
            .pop_if_empty()
            .push(container)
            .extend(path.split('/'));
        Ok(url)
    }

    /// ARM URL of `/subscriptions/{id}/<segments>`.
    fn management_url(&self, segments: &[&str], api_version: &str) -> Result<Url, PublishError> {
        let mut url = Url::parse(&self.management_endpoint)
            .map_err(|e| PublishError::InvalidPath(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidPath(self.management_endpoint.clone()))?
            .pop_if_empty()
            .push("subscriptions")
            .push(&self.config.subscription_id)
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    fn account_url(&self, account: &str) -> Result<Url, PublishError> {
        self.management_url(
            &[
                "resourceGroups",
                self.config.resource_group.as_str(),
                "providers",
                "Microsoft.Storage",
                "storageAccounts",
                account,
            ],
            STORAGE_API_VERSION,
        )
    }

    fn blob_headers(&self) -> Result<HeaderMap, PublishError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.storage_token))
            .map_err(|_| PublishError::InvalidPath("storage token".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn management(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.management_token)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PublishError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn check_name_availability(&self, account: &str) -> Result<(), PublishError> {
        let url = self.management_url(
            &["providers", "Microsoft.Storage", "checkNameAvailability"],
            STORAGE_API_VERSION,
        )?;
        let response = self
            .management(Method::POST, url)
            .json(&NameAvailabilityRequest {
                name: account,
                kind: "Microsoft.Storage/storageAccounts",
            })
            .send()
            .await?;
        let availability: NameAvailability = Self::check(response).await?.json().await?;
        if availability.name_available {
            Ok(())
        } else {
            Err(PublishError::AccountUnavailable(
                availability
                    .message
                    .unwrap_or_else(|| account.to_string()),
            ))
        }
    }

    /// Create the account and wait until ARM reports it ready.
    async fn create_account(&self, account: &str) -> Result<(), PublishError> {
        let url = self.account_url(account)?;
        let response = self
            .management(Method::PUT, url.clone())
            .json(&CreateAccountRequest::new(&self.config.location))
            .send()
            .await?;
        Self::check(response).await?;

        let max_attempts = self.creation_poll.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let response = self.management(Method::GET, url.clone()).send().await?;
            let state: Account = Self::check(response).await?.json().await?;
            let provisioning_state = state.properties.and_then(|p| p.provisioning_state);
            match provisioning_state.as_deref() {
                Some("Succeeded") => return Ok(()),
                Some("Failed") => {
                    return Err(PublishError::Backend {
                        status: 500,
                        message: format!("storage account {account} failed to provision"),
                    })
                }
                _ => {
                    tracing::debug!(account, attempt, state = ?provisioning_state, "Storage account not ready");
                    tokio::time::sleep(self.creation_poll.delay).await;
                }
            }
        }
        Err(PublishError::Backend {
            status: 504,
            message: format!("storage account {account} not ready after {max_attempts} polls"),
        })
    }

    async fn assign_blob_contributor(&self, account: &str, principal_id: &str) -> Result<(), PublishError> {
        let scope = self.account_url(account)?;
        let mut url = scope.clone();
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidPath(account.to_string()))?
            .extend(["providers", "Microsoft.Authorization", "roleAssignments"])
            .push(&uuid::Uuid::new_v4().to_string());
        url.set_query(None);
        url.query_pairs_mut().append_pair("api-version", ROLE_API_VERSION);

        let body = RoleAssignmentRequest {
            properties: RoleAssignmentProperties {
                role_definition_id: format!(
                    "/subscriptions/{}/providers/Microsoft.Authorization/roleDefinitions/{BLOB_CONTRIBUTOR_ROLE}",
                    self.config.subscription_id
                ),
                principal_id: principal_id.to_string(),
            },
        };
        let response = self.management(Method::PUT, url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn enable_static_website(&self, account: &str) -> Result<(), PublishError> {
        let mut url = self.service_url(account)?;
        url.set_query(Some("restype=service&comp=properties"));
        let response = self
            .client
            .put(url)
            .headers(self.blob_headers()?)
            .header(CONTENT_TYPE, "application/xml")
            .body(STATIC_WEBSITE_PROPERTIES)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for AzurePublisher {
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError> {
        check_path(account, path)?;
        let url = self.blob_url(account, SITE_CONTAINER, path)?;
        tracing::debug!(account, path, "Put Blob");

        let response = self
            .client
            .put(url)
            .headers(self.blob_headers()?)
            .header("x-ms-blob-type", "BlockBlob")
            .header(CONTENT_TYPE, content_type_for(path))
            .body(content.to_string())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError> {
        check_path(account, file)?;
        let source = self.blob_url(&self.config.template_account, TEMPLATE_CONTAINER, file)?;
        let target = self.blob_url(account, SITE_CONTAINER, file)?;
        tracing::debug!(account, file, source = %source, "Copy Blob");

        let response = self
            .client
            .put(target)
            .headers(self.blob_headers()?)
            .header("x-ms-copy-source", source.as_str())
            .header(
                "x-ms-copy-source-authorization",
                format!("Bearer {}", self.config.storage_token),
            )
            .send()
            .await?;
        match Self::check(response).await {
            Err(PublishError::Backend { status: 404, message })
                if message.contains("CannotVerifyCopySource") =>
            {
                Err(PublishError::TemplateMissing(source.to_string()))
            }
            other => other.map(|_| ()),
        }
    }

    async fn provision(&self, account: &str) -> Result<(), PublishError> {
        check_account(account)?;
        self.check_name_availability(account).await?;
        self.create_account(account).await?;
        tracing::info!(account, location = %self.config.location, "Created storage account");
        if let Some(principal_id) = &self.config.principal_id {
            self.assign_blob_contributor(account, principal_id).await?;
        }
        self.enable_static_website(account).await
    }

    fn backend_name(&self) -> &'static str {
        "azure"
    }
}
