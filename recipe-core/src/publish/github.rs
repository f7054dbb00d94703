//! GitHub contents API backend. Every account is a top-level directory of
//! one repository and every write is one commit.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{check_path, PublishError, Publisher};

const API_BASE: &str = "https://api.github.com";
const TEMPLATE_ROOT: &str = "template";

pub struct GitHubPublisher {
    client: reqwest::Client,
    token: String,
    repository: String,
    branch: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GitHubPublisher {
    pub fn new(
        token: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            repository: repository.into(),
            branch: branch.into(),
            api_base: API_BASE.to_string(),
        }
    }

    fn contents_url(&self, repo_path: &str) -> Result<Url, PublishError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| PublishError::InvalidPath(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidPath(self.api_base.clone()))?
            .pop_if_empty()
            .push("repos")
            .extend(self.repository.split('/'))
            .push("contents")
            .extend(repo_path.split('/'));
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "recipe-server")
    }

    /// Current blob of `repo_path` on the branch, or None if it does not exist.
    async fn get_entry(&self, repo_path: &str) -> Result<Option<ContentsEntry>, PublishError> {
        let mut url = self.contents_url(repo_path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let response = self.request(reqwest::Method::GET, url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(PublishError::Backend {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn put_file(&self, repo_path: &str, bytes: &[u8]) -> Result<(), PublishError> {
        let sha = self.get_entry(repo_path).await?.map(|e| e.sha);
        let body = PutContents {
            message: format!("Update {repo_path}"),
            content: STANDARD.encode(bytes),
            branch: &self.branch,
            sha,
        };

        let response = self
            .request(reqwest::Method::PUT, self.contents_url(repo_path)?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Backend {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        tracing::debug!(repo_path, "Committed file");
        Ok(())
    }
}

/// The contents API wraps base64 at 60 columns.
fn decode_contents(encoded: &str) -> Result<Vec<u8>, PublishError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| PublishError::Backend {
        status: 200,
        message: format!("invalid base64 content: {e}"),
    })
}

#[async_trait]
impl Publisher for GitHubPublisher {
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError> {
        check_path(account, path)?;
        self.put_file(&format!("{account}/{path}"), content.as_bytes())
            .await
    }

    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError> {
        check_path(account, file)?;
        let source = format!("{TEMPLATE_ROOT}/{file}");
        let entry = self
            .get_entry(&source)
            .await?
            .ok_or_else(|| PublishError::TemplateMissing(source.clone()))?;
        let encoded = entry
            .content
            .ok_or_else(|| PublishError::TemplateMissing(source.clone()))?;
        let bytes = decode_contents(&encoded)?;
        self.put_file(&format!("{account}/{file}"), &bytes).await
    }

    fn backend_name(&self) -> &'static str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url() {
        let publisher = GitHubPublisher::new("t", "octo/recipes", "main");
        let url = publisher.contents_url("abc123/recipes/Tomato-Soup.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/recipes/contents/abc123/recipes/Tomato-Soup.md"
        );
    }

    #[test]
    fn test_decode_wrapped_contents() {
        let encoded = "IyBUb21h\ndG8gU291\ncA==\n";
        assert_eq!(decode_contents(encoded).unwrap(), b"# Tomato Soup");
    }

    #[test]
    fn test_put_body_omits_missing_sha() {
        let body = PutContents {
            message: "Update a".to_string(),
            content: "eA==".to_string(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }
}
