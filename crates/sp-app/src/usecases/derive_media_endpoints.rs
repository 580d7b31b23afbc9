use std::sync::Arc;

use tracing::debug;

use sp_core::endpoint::{project_device, DerivedEndpoint, EndpointMap};
use sp_core::ids::SpaceId;

use crate::errors::MediaActivityError;
use crate::usecases::ScanMediaCapabilities;

/// Projects capability summaries into derived endpoints.
///
/// Nothing is cached: every call re-reads the device graph, so endpoints
/// always reflect the current devices and are identical for identical graphs.
pub struct DeriveMediaEndpoints {
    scanner: Arc<ScanMediaCapabilities>,
}

impl DeriveMediaEndpoints {
    pub fn new(scanner: Arc<ScanMediaCapabilities>) -> Self {
        Self { scanner }
    }

    pub async fn ensure_space(&self, space_id: &SpaceId) -> Result<(), MediaActivityError> {
        self.scanner.ensure_space(space_id).await
    }

    #[tracing::instrument(
        name = "usecase.derive_media_endpoints.execute",
        skip(self),
        fields(space_id = %space_id)
    )]
    pub async fn execute(&self, space_id: &SpaceId) -> Result<Vec<DerivedEndpoint>, MediaActivityError> {
        let summaries = self.scanner.execute(space_id).await?;
        let endpoints: Vec<DerivedEndpoint> = summaries
            .iter()
            .flat_map(|summary| project_device(space_id, summary))
            .collect();

        debug!(endpoints = endpoints.len(), "Derived media endpoints");
        Ok(endpoints)
    }

    pub async fn endpoint_map(&self, space_id: &SpaceId) -> Result<EndpointMap, MediaActivityError> {
        Ok(EndpointMap::new(self.execute(space_id).await?))
    }
}
