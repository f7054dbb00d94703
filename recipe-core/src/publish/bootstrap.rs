//! First-login site setup: copy the static viewer into a new account.

use std::time::Duration;

use super::{PublishError, Publisher};

/// Files every site needs, relative to the template root.
pub const TEMPLATE_FILES: [&str; 4] = [
    "index.html",
    "libs/markdown-it.min.js",
    "libs/modern-normalize.min.css",
    "libs/water.light.min.css",
];

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Provision `account`, then copy all template files into it. A freshly
/// provisioned account can take a while to accept writes, so each file is
/// retried per `policy`. Stops at the first file that exhausts its attempts
/// or fails with a permanent error.
pub async fn bootstrap_site(
    publisher: &dyn Publisher,
    account: &str,
    policy: RetryPolicy,
) -> Result<(), PublishError> {
    publisher.provision(account).await.inspect_err(|e| {
        tracing::error!(account, backend = publisher.backend_name(), error = %e, "Provisioning failed");
    })?;
    for file in TEMPLATE_FILES {
        copy_with_retry(publisher, account, file, policy).await?;
    }
    tracing::info!(account, backend = publisher.backend_name(), "Site bootstrapped");
    Ok(())
}

async fn copy_with_retry(
    publisher: &dyn Publisher,
    account: &str,
    file: &str,
    policy: RetryPolicy,
) -> Result<(), PublishError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match publisher.copy_template(account, file).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    account,
                    file,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Template copy failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(account, file, attempts = attempt, error = %e, "Template copy failed");
                return Err(e);
            }
        }
    }
}
