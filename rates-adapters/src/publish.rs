//! Graph publishers.
//!
//! [`LocalPublisher`] serves charts from the filesystem, optionally through a
//! static file host. [`HttpPublisher`] uploads the PNG to an image endpoint
//! that answers with the public URL.

use std::io;
use std::path::{Path, PathBuf};

use rates_types::{GraphPublisher, PublishError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

fn file_name(path: &Path) -> Result<&str, PublishError> {
    path.file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| {
            PublishError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            ))
        })
}

/// Publishes charts where they are, or copied into a public directory.
#[derive(Debug, Clone, Default)]
pub struct LocalPublisher {
    public_dir: Option<PathBuf>,
    public_url: Option<String>,
}

impl LocalPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every chart into `dir` before publishing it.
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(dir.into());
        self
    }

    /// Base URL the published directory is served under.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }
}

#[async_trait::async_trait]
impl GraphPublisher for LocalPublisher {
    #[instrument(skip(self))]
    async fn upload(&self, path: &Path) -> Result<String, PublishError> {
        let name = file_name(path)?;

        let published = match &self.public_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let target = dir.join(name);
                tokio::fs::copy(path, &target).await?;
                target
            }
            None => {
                tokio::fs::metadata(path).await?;
                path.to_path_buf()
            }
        };

        let url = match &self.public_url {
            Some(base) => format!("{}/{}", base, name),
            None => {
                let absolute = tokio::fs::canonicalize(&published).await?;
                format!("file://{}", absolute.display())
            }
        };

        info!("Published graph at {}", url);
        Ok(url)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

/// Publishes charts by POSTing the PNG bytes to an upload endpoint.
///
/// The endpoint must answer with a JSON body `{"url": "..."}`.
#[derive(Clone)]
pub struct HttpPublisher {
    endpoint: String,
    http: Client,
}

impl HttpPublisher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl GraphPublisher for HttpPublisher {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn upload(&self, path: &Path) -> Result<String, PublishError> {
        let name = file_name(path)?.to_string();
        let bytes = tokio::fs::read(path).await?;
        info!("Uploading {} ({} bytes)", name, bytes.len());

        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .header("X-File-Name", name)
            .body(bytes)
            .send()
            .await
            .map_err(|e| PublishError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PublishError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            warn!("Upload rejected with {}: {}", status, message);
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|r| r.url)
            .filter(|url| !url.is_empty())
            .ok_or(PublishError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(dir: &Path) -> PathBuf {
        let path = dir.join("sek-eur.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        path
    }

    #[tokio::test]
    async fn test_local_publisher_with_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new().with_public_url("https://charts.example/graph/");

        let url = publisher.upload(&chart(dir.path())).await.unwrap();

        assert_eq!(url, "https://charts.example/graph/sek-eur.png");
    }

    #[tokio::test]
    async fn test_local_publisher_file_url() {
        let dir = tempfile::tempdir().unwrap();

        let url = LocalPublisher::new()
            .upload(&chart(dir.path()))
            .await
            .unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("sek-eur.png"));
    }

    #[tokio::test]
    async fn test_local_publisher_copies_into_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        let publisher = LocalPublisher::new().with_public_dir(&public);

        publisher.upload(&chart(dir.path())).await.unwrap();

        assert_eq!(std::fs::read(public.join("sek-eur.png")).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_local_publisher_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = LocalPublisher::new()
            .upload(&dir.path().join("missing.png"))
            .await;

        assert!(matches!(result, Err(PublishError::Io(_))));
    }
}
