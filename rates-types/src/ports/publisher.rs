//! Graph publisher port.
//!
//! Stores a rendered chart somewhere fetchable and hands back its URL.

use std::path::Path;

use crate::error::PublishError;

#[async_trait::async_trait]
pub trait GraphPublisher: Send + Sync {
    /// Publishes the image at `path` and returns a stable URL for it.
    async fn upload(&self, path: &Path) -> Result<String, PublishError>;
}
