use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::model::roster::Roster;
use crate::report::aggregator::Aggregator;
use crate::report::clock::Clock;
use crate::source::{AttendanceSource, RecordScope};
use crate::utils::directory_cache::DirectoryCache;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub source: Arc<dyn AttendanceSource>,
    pub directory: DirectoryCache,
    pub clock: Arc<dyn Clock>,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn records(&self, scope: RecordScope) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.source
            .records(&scope)
            .await
            .map_err(|e| ApiError::internal("Failed to load attendance records", e))
    }

    pub async fn roster(&self) -> Result<Arc<Roster>, ApiError> {
        self.directory
            .roster()
            .await
            .map_err(|e| ApiError::internal("Failed to load employee directory", e))
    }
}
