use async_trait::async_trait;

use crate::domain::shared_kernel::Location;
use crate::utils::CancellationToken;

/// Address resolution; failures are infrastructure errors, not domain errors
#[async_trait]
pub trait GeoClient: Send + Sync {
    async fn get_location(&self, street: &str, cancel: &CancellationToken) -> anyhow::Result<Location>;
}
