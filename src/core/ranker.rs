use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::pager::{PageAssembler, PageError};
use crate::models::{CallerError, EventPage, PagingPolicy, RankEventsRequest};
use crate::services::{EventStore, StoreError};

/// Message returned when a required caller field is absent
pub const MISSING_PARAMETERS: &str = "Missing required parameters";

/// Errors from a ranking request
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<PageError> for RankingError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Store(e) => RankingError::Store(e),
            PageError::Cancelled => RankingError::Cancelled,
        }
    }
}

/// Ranking request orchestrator
///
/// Validates the caller fields before any store read, resolves paging
/// defaults, then hands off to the [`PageAssembler`].
#[derive(Clone)]
pub struct RankingService {
    store: Arc<dyn EventStore>,
    assembler: PageAssembler,
}

impl RankingService {
    pub fn new(store: Arc<dyn EventStore>, policy: PagingPolicy) -> Self {
        Self {
            store,
            assembler: PageAssembler::new(policy),
        }
    }

    /// Rank upcoming events for the caller described by `request`
    pub async fn rank(
        &self,
        request: &RankEventsRequest,
        cancel: &CancellationToken,
    ) -> Result<EventPage, RankingError> {
        self.rank_at(request, Utc::now(), cancel).await
    }

    /// Same as [`rank`](Self::rank) with an explicit notion of "now"
    pub async fn rank_at(
        &self,
        request: &RankEventsRequest,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<EventPage, RankingError> {
        let caller = request.caller_context().map_err(|e| match e {
            CallerError::Missing => RankingError::Validation(MISSING_PARAMETERS.to_string()),
            CallerError::InvalidAge(_) => RankingError::Validation(e.to_string()),
        })?;

        let policy = self.assembler.policy();
        let offset = request.offset.unwrap_or(0);
        let page_size = request
            .page_size
            .unwrap_or(policy.default_page_size)
            .clamp(1, policy.max_page_size.max(1));

        tracing::info!(
            "Ranking events for user: {}, offset: {}, page size: {}",
            caller.user_id,
            offset,
            page_size
        );

        let page = self
            .assembler
            .assemble(self.store.as_ref(), &caller, offset, page_size, now, cancel)
            .await?;

        tracing::info!(
            "Returning {} events for user {} (has_more: {}, next_offset: {:?})",
            page.events.len(),
            caller.user_id,
            page.has_more,
            page.next_offset
        );

        Ok(page)
    }
}

impl std::fmt::Debug for RankingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingService")
            .field("assembler", &self.assembler)
            .finish()
    }
}
