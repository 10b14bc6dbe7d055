use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::services::AffinityService;

/// One expiry cycle: every pending assignment older than `ttl` becomes expired.
pub async fn expire_stale_assignments(
    affinity: Arc<AffinityService>,
    ttl: chrono::Duration,
) -> Result<usize, super::WorkerError> {
    let start = Instant::now();
    debug!("Starting assignment expiry cycle");

    let expired = affinity.expire_stale_assignments(ttl).await?;

    info!(
        expired,
        duration_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
        "Assignment expiry completed"
    );

    Ok(expired)
}
