//! S3-compatible backend (AWS S3, MinIO) over path-style REST with
//! Signature Version 4. Every account is a bucket with a public-read policy;
//! template files are server-side copied from a shared template bucket.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode, Url};
use sha2::{Digest, Sha256};

use super::{check_account, check_path, content_type_for, PublishError, Publisher};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TEMPLATE_BUCKET: &str = "template";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Base URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub template_bucket: String,
}

pub struct S3Publisher {
    client: reqwest::Client,
    endpoint: Url,
    config: S3Config,
}

impl S3Publisher {
    pub fn new(config: S3Config) -> Result<Self, PublishError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| PublishError::InvalidPath(format!("{}: {e}", config.endpoint)))?;
        if endpoint.cannot_be_a_base() || endpoint.host_str().is_none() {
            return Err(PublishError::InvalidPath(config.endpoint.clone()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            config,
        })
    }

    /// Path-style URL of `bucket` or of `key` inside it. Segments are
    /// encoded the way SigV4 canonicalizes them.
    fn url(&self, bucket: &str, key: Option<&str>) -> Url {
        let mut path = self.endpoint.path().trim_end_matches('/').to_string();
        path.push('/');
        path.push_str(&uri_encode(bucket));
        if let Some(key) = key {
            for segment in key.split('/') {
                path.push('/');
                path.push_str(&uri_encode(segment));
            }
        }
        let mut url = self.endpoint.clone();
        url.set_path(&path);
        url.set_query(None);
        url
    }

    /// Send a signed request and fail on any non-success status.
    async fn send(
        &self,
        method: Method,
        url: Url,
        extra: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<reqwest::Response, PublishError> {
        let signed = sign(
            &self.config,
            method.as_str(),
            &url,
            extra,
            &sha256_hex(&body),
            Utc::now(),
        );
        let mut request = self.client.request(method, url);
        for (name, value) in extra.iter().map(|(n, v)| (*n, v.as_str())) {
            request = request.header(name, value);
        }
        for (name, value) in &signed {
            request = request.header(*name, value);
        }
        let response = request.body(body).send().await?;

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

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, PublishError> {
        match self.send(Method::HEAD, self.url(bucket, None), &[], Vec::new()).await {
            Ok(_) => Ok(true),
            Err(PublishError::Backend { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), PublishError> {
        let body = create_bucket_body(&self.config.region).into_bytes();
        let err = match self.send(Method::PUT, self.url(bucket, None), &[], body).await {
            Ok(_) => {
                tracing::info!(bucket, "Created bucket");
                return Ok(());
            }
            Err(e) => e,
        };
        if self.bucket_exists(bucket).await? {
            tracing::info!(bucket, error = %err, "Bucket already exists");
            Ok(())
        } else {
            Err(err)
        }
    }

    async fn set_public_read(&self, bucket: &str) -> Result<(), PublishError> {
        let mut url = self.url(bucket, None);
        url.set_query(Some("policy"));
        let policy = public_read_policy(bucket);
        self.send(Method::PUT, url, &[], policy.into_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for S3Publisher {
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError> {
        check_path(account, path)?;
        tracing::debug!(bucket = account, path, "Put Object");
        let extra = [("content-type", content_type_for(path).to_string())];
        self.send(
            Method::PUT,
            self.url(account, Some(path)),
            &extra,
            content.as_bytes().to_vec(),
        )
        .await?;
        Ok(())
    }

    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError> {
        check_path(account, file)?;
        let source = self.url(&self.config.template_bucket, Some(file));
        let source_path = source.path().strip_prefix(self.endpoint.path().trim_end_matches('/'));
        let source_path = source_path.unwrap_or(source.path()).to_string();
        tracing::debug!(bucket = account, file, source = %source_path, "Copy Object");

        let extra = [("x-amz-copy-source", source_path.clone())];
        let result = self
            .send(Method::PUT, self.url(account, Some(file)), &extra, Vec::new())
            .await;
        let response = match result {
            Err(PublishError::Backend { status: 404, message }) if message.contains("NoSuchKey") => {
                return Err(PublishError::TemplateMissing(source_path));
            }
            other => other?,
        };
        // Copy Object can fail after the 200 status line has been sent.
        let body = response.text().await?;
        if body.contains("<Error>") {
            return Err(PublishError::Backend {
                status: StatusCode::OK.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    async fn provision(&self, account: &str) -> Result<(), PublishError> {
        check_account(account)?;
        self.make_bucket(account).await?;
        self.set_public_read(account).await
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

/// Anonymous `s3:GetObject` on every object of `bucket`.
fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": ["s3:GetObject"],
            "Effect": "Allow",
            "Principal": {"AWS": ["*"]},
            "Resource": [format!("arn:aws:s3:::{bucket}/*")],
            "Sid": ""
        }]
    })
    .to_string()
}

/// `us-east-1` is the default location and must not be named explicitly.
fn create_bucket_body(region: &str) -> String {
    if region == DEFAULT_REGION {
        return String::new();
    }
    format!(
        "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <LocationConstraint>{region}</LocationConstraint></CreateBucketConfiguration>"
    )
}

/// Percent-encode everything except RFC 3986 unreserved characters.
fn uri_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    const BLOCK_SIZE: usize = 64;
    let mut block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        block[..32].copy_from_slice(&Sha256::digest(key));
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    inner.update(block.map(|b| b ^ 0x36));
    inner.update(data);
    let mut outer = Sha256::new();
    outer.update(block.map(|b| b ^ 0x5c));
    outer.update(inner.finalize());
    outer.finalize().into()
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> [u8; 32] {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Headers that authenticate a request to `url` with SigV4: `x-amz-date`,
/// `x-amz-content-sha256` and `authorization`. `extra` headers are signed
/// too and must be sent unchanged.
fn sign(
    config: &S3Config,
    method: &str,
    url: &Url,
    extra: &[(&str, String)],
    payload_hash: &str,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let host = match url.port() {
        Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
        None => url.host_str().unwrap_or_default().to_string(),
    };

    let mut headers: Vec<(String, String)> = vec![
        ("host".to_string(), host),
        ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    headers.extend(
        extra
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string())),
    );
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{method}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        url.path(),
        canonical_query(url),
    );
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", config.region);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );
    let key = signing_key(&config.secret_key, &date, &config.region, SERVICE);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    vec![
        ("x-amz-date", amz_date),
        ("x-amz-content-sha256", payload_hash.to_string()),
        (
            "authorization",
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                config.access_key
            ),
        ),
    ]
}
