pub mod discord;

use anyhow::Result;

use crate::post::EnrichedPost;

/// Channel seam for the pipeline: render one message per post and send it.
/// Failures surface as errors the pipeline tolerates per post.
#[async_trait::async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, post: &EnrichedPost) -> Result<()>;
}
