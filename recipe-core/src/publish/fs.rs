use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::bootstrap::TEMPLATE_FILES;
use super::{check_path, PublishError, Publisher};

/// Publisher writing each account as a directory under `root`.
#[derive(Debug, Clone)]
pub struct FsPublisher {
    root: PathBuf,
    template_dir: PathBuf,
}

impl FsPublisher {
    pub fn new(root: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            template_dir: template_dir.into(),
        }
    }

    /// Like [`FsPublisher::new`], but fails unless every template file is
    /// present in `template_dir`.
    pub fn open(
        root: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
    ) -> Result<Self, PublishError> {
        let publisher = Self::new(root, template_dir);
        for file in TEMPLATE_FILES {
            let source = publisher.template_dir.join(file);
            if !source.is_file() {
                return Err(PublishError::TemplateMissing(source.display().to_string()));
            }
        }
        Ok(publisher)
    }

    fn target(&self, account: &str, path: &str) -> Result<PathBuf, PublishError> {
        check_path(account, path)?;
        Ok(self.root.join(account).join(path))
    }

    async fn ensure_parent(path: &Path) -> Result<(), PublishError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for FsPublisher {
    async fn publish(&self, account: &str, path: &str, content: &str) -> Result<(), PublishError> {
        let target = self.target(account, path)?;
        Self::ensure_parent(&target).await?;
        tokio::fs::write(&target, content).await?;
        tracing::debug!(path = %target.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }

    async fn copy_template(&self, account: &str, file: &str) -> Result<(), PublishError> {
        let target = self.target(account, file)?;
        let source = self.template_dir.join(file);
        if !tokio::fs::try_exists(&source).await? {
            return Err(PublishError::TemplateMissing(source.display().to_string()));
        }
        Self::ensure_parent(&target).await?;
        tokio::fs::copy(&source, &target).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_creates_directories() {
        let root = TempDir::new().unwrap();
        let publisher = FsPublisher::new(root.path(), root.path().join("template"));
        publisher
            .publish("abc123", "recipes/Tomato-Soup.md", "# Tomato Soup\n")
            .await
            .unwrap();
        let written =
            std::fs::read_to_string(root.path().join("abc123/recipes/Tomato-Soup.md")).unwrap();
        assert_eq!(written, "# Tomato Soup\n");
    }

    #[tokio::test]
    async fn test_copy_template() {
        let root = TempDir::new().unwrap();
        let template = root.path().join("template");
        std::fs::create_dir_all(template.join("libs")).unwrap();
        std::fs::write(template.join("libs/water.light.min.css"), "body{}").unwrap();

        let publisher = FsPublisher::new(root.path().join("sites"), &template);
        publisher
            .copy_template("abc123", "libs/water.light.min.css")
            .await
            .unwrap();
        let copied =
            std::fs::read_to_string(root.path().join("sites/abc123/libs/water.light.min.css"))
                .unwrap();
        assert_eq!(copied, "body{}");
    }

    #[tokio::test]
    async fn test_missing_template() {
        let root = TempDir::new().unwrap();
        let publisher = FsPublisher::new(root.path(), root.path().join("template"));
        let err = publisher
            .copy_template("abc123", "index.html")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::TemplateMissing(_)));
    }

    #[test]
    fn test_open_requires_every_template_file() {
        let root = TempDir::new().unwrap();
        let template = root.path().join("template");
        std::fs::create_dir_all(template.join("libs")).unwrap();
        std::fs::write(template.join("index.html"), "<html></html>").unwrap();

        let err = FsPublisher::open(root.path().join("sites"), &template).unwrap_err();
        match err {
            PublishError::TemplateMissing(path) => {
                assert!(path.ends_with("libs/markdown-it.min.js"), "{path}")
            }
            other => panic!("expected TemplateMissing, got {other:?}"),
        }

        for file in &TEMPLATE_FILES[1..] {
            std::fs::write(template.join(file), "/* lib */").unwrap();
        }
        assert!(FsPublisher::open(root.path().join("sites"), &template).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let root = TempDir::new().unwrap();
        let publisher = FsPublisher::new(root.path(), root.path().join("template"));
        let err = publisher
            .publish("abc123", "recipes/../../escape.md", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidPath(_)));
    }
}
