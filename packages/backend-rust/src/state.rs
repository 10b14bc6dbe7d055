use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::DatabaseProxy;
use crate::services::AffinityService;
use crate::store::StoreKind;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db_proxy: Option<Arc<DatabaseProxy>>,
    affinity: Arc<AffinityService>,
}

impl AppState {
    pub fn new(affinity: AffinityService, db_proxy: Option<Arc<DatabaseProxy>>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db_proxy,
            affinity: Arc::new(affinity),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db_proxy(&self) -> Option<Arc<DatabaseProxy>> {
        self.db_proxy.clone()
    }

    pub fn affinity(&self) -> Arc<AffinityService> {
        Arc::clone(&self.affinity)
    }

    pub fn store_kind(&self) -> StoreKind {
        self.affinity.stores().kind()
    }
}
