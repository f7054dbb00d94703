use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::bootstrap::TEMPLATE_FILES;
use super::{check_account, check_path, PublishError, Publisher};

#[derive(Debug, Default)]
struct MemoryState {
    objects: HashMap<(String, String), String>,
    templates: HashMap<String, String>,
    failing_copies: usize,
    copy_attempts: usize,
    failing_provision: bool,
    events: Vec<String>,
}

/// Publisher that keeps every site in memory.
#[derive(Debug)]
pub struct MemoryPublisher {
    state: Mutex<MemoryState>,
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPublisher {
    /// Create a publisher whose template holds a placeholder for every
    /// template file.
    pub fn new() -> Self {
        let templates = TEMPLATE_FILES
            .iter()
            .map(|f| (f.to_string(), format!("<!-- {f} -->")))
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                templates,
                ..Default::default()
            }),
        }
    }

    /// Content of `path` in `account`, if published.
    pub fn get(&self, account: &str, path: &str) -> Option<String> {
        self.lock()
            .objects
            .get(&(account.to_string(), path.to_string()))
            .cloned()
    }

    /// All paths published to `account`.
    pub fn paths(&self, account: &str) -> Vec<String> {
        self.lock()
            .objects
            .keys()
            .filter(|(a, _)| a == account)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Make the next `n` template copies fail.
    pub fn fail_next_copies(&self, n: usize) {
        self.lock().failing_copies = n;
    }

    /// Number of template copies attempted so far.
    pub fn copy_attempts(&self) -> usize {
        self.lock().copy_attempts
    }

    /// Make the next provisioning fail.
    pub fn fail_next_provision(&self) {
        self.lock().failing_provision = true;
    }

    /// Successful provisions and template copies, in order, as
    /// `"provision <account>"` and `"copy <account> <file>"`.
    pub fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError> {
        check_path(account, path)?;
        self.lock()
            .objects
            .insert((account.to_string(), path.to_string()), content.to_string());
        Ok(())
    }

    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError> {
        check_path(account, file)?;
        let mut state = self.lock();
        state.copy_attempts += 1;
        if state.failing_copies > 0 {
            state.failing_copies -= 1;
            return Err(PublishError::Backend {
                status: 503,
                message: "account not ready".to_string(),
            });
        }
        let content = state
            .templates
            .get(file)
            .cloned()
            .ok_or_else(|| PublishError::TemplateMissing(file.to_string()))?;
        state
            .objects
            .insert((account.to_string(), file.to_string()), content);
        state.events.push(format!("copy {account} {file}"));
        Ok(())
    }

    async fn provision(&self, account: &str) -> Result<(), PublishError> {
        check_account(account)?;
        let mut state = self.lock();
        if std::mem::take(&mut state.failing_provision) {
            return Err(PublishError::Backend {
                status: 500,
                message: "provisioning failed".to_string(),
            });
        }
        state.events.push(format!("provision {account}"));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
