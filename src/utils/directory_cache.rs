use anyhow::{Result, anyhow};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::model::roster::Roster;
use crate::source::AttendanceSource;

const ROSTER_KEY: &str = "roster";

/// Employee and department directory, reloaded from the source after the TTL.
#[derive(Clone)]
pub struct DirectoryCache {
    cache: Cache<&'static str, Arc<Roster>>,
    source: Arc<dyn AttendanceSource>,
}

impl DirectoryCache {
    pub fn new(source: Arc<dyn AttendanceSource>, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            source,
        }
    }

    /// Current roster; concurrent misses share one load.
    pub async fn roster(&self) -> Result<Arc<Roster>> {
        self.cache
            .try_get_with(ROSTER_KEY, load(self.source.clone()))
            .await
            .map_err(|e| anyhow!("{:#}", e))
    }

    /// Load the directory ahead of the first request.
    pub async fn warmup(&self) -> Result<()> {
        let roster = self.roster().await?;
        log::info!(
            "Directory cache warmup complete: {} employees, {} departments",
            roster.employees().len(),
            roster.departments().len()
        );
        Ok(())
    }
}

async fn load(source: Arc<dyn AttendanceSource>) -> Result<Arc<Roster>> {
    let (employees, departments) =
        futures::future::try_join(source.employees(), source.departments()).await?;
    Ok(Arc::new(Roster::new(employees, departments)))
}
