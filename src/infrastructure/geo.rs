use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::shared_kernel::{Location, RandomSource};
use crate::ports::GeoClient;
use crate::utils::CancellationToken;

/// Stand-in geocoder: every street resolves to a random grid location
pub struct RandomGeoClient {
    random: Arc<dyn RandomSource>,
}

impl RandomGeoClient {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

#[async_trait]
impl GeoClient for RandomGeoClient {
    async fn get_location(&self, street: &str, cancel: &CancellationToken) -> anyhow::Result<Location> {
        if cancel.is_cancelled() {
            anyhow::bail!("geo lookup cancelled");
        }
        if street.trim().is_empty() {
            anyhow::bail!("street is required");
        }

        let location = Location::create_random(self.random.as_ref());
        tracing::debug!(street, %location, "Resolved street to location");
        Ok(location)
    }
}
