use async_trait::async_trait;

use crate::events::MediaActivityEvent;

/// Sink for activation lifecycle events. Emission is fire-and-forget.
#[async_trait]
pub trait MediaActivityEventPort: Send + Sync {
    async fn emit(&self, event: MediaActivityEvent);
}
