use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::{distance::haversine_distance, filters::ineligibility_reason};
use crate::models::{CallerContext, EventPage, PagingPolicy, RankedEvent};
use crate::services::{EventStore, StoreError};

/// Errors that abort a page request
///
/// Either way no partial page is returned.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to read events: {0}")]
    Store(#[from] StoreError),

    #[error("Page request cancelled")]
    Cancelled,
}

/// Why an [`EligibleEvents`] scan stopped reading from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// The store returned a short batch; nothing lies beyond the cursor
    Exhausted,
    /// `max_round_trips` store reads were spent
    RoundTripCap,
    /// The wall-clock scan budget ran out
    ScanBudget,
}

/// Limits on a single scan
#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    pub batch_size: u32,
    pub max_round_trips: u32,
    pub deadline: Option<Instant>,
}

/// Pull-based sequence of eligible, distance-annotated events
///
/// Each store read fetches `batch_size` rows starting at the cursor. Rows are
/// filtered against the caller and the survivors are buffered together with
/// their store position, so a consumer that stops early can resume exactly
/// after the last event it took.
pub struct EligibleEvents<'a> {
    store: &'a dyn EventStore,
    caller: &'a CallerContext,
    now: DateTime<Utc>,
    limits: ScanLimits,
    cancel: &'a CancellationToken,
    cursor: u64,
    pending: VecDeque<(u64, RankedEvent)>,
    round_trips: u32,
    rows_scanned: u64,
    stopped: Option<ScanStop>,
}

impl<'a> EligibleEvents<'a> {
    pub fn new(
        store: &'a dyn EventStore,
        caller: &'a CallerContext,
        now: DateTime<Utc>,
        start: u64,
        limits: ScanLimits,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            store,
            caller,
            now,
            limits,
            cancel,
            cursor: start,
            pending: VecDeque::new(),
            round_trips: 0,
            rows_scanned: 0,
            stopped: None,
        }
    }

    /// Next eligible event and its store position
    ///
    /// Returns `Ok(None)` once the scan has stopped and the buffer is drained;
    /// [`stop_reason`](Self::stop_reason) says why.
    pub async fn next(&mut self) -> Result<Option<(u64, RankedEvent)>, PageError> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Ok(Some(item));
            }
            if self.stopped.is_some() {
                return Ok(None);
            }
            self.read_batch().await?;
        }
    }

    async fn read_batch(&mut self) -> Result<(), PageError> {
        if self.round_trips >= self.limits.max_round_trips {
            self.stopped = Some(ScanStop::RoundTripCap);
            return Ok(());
        }
        if self.limits.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.stopped = Some(ScanStop::ScanBudget);
            return Ok(());
        }

        let store = self.store;
        let cancel = self.cancel;
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PageError::Cancelled),
            result = store.fetch_upcoming(self.now, self.cursor, self.limits.batch_size) => Some(result?),
            _ = budget_elapsed(self.limits.deadline) => None,
        };
        self.round_trips += 1;

        // The read outlived the budget; the cursor stays where it was
        let Some(batch) = read else {
            tracing::debug!("Scan budget expired during read at {}", self.cursor);
            self.stopped = Some(ScanStop::ScanBudget);
            return Ok(());
        };

        let returned = batch.len() as u64;
        let before = self.pending.len();

        for (index, event) in batch.into_iter().enumerate() {
            let position = self.cursor + index as u64;

            if let Some(reason) = ineligibility_reason(&event, self.caller, self.now) {
                tracing::trace!("Skipping event {} at {}: {:?}", event.id, position, reason);
                continue;
            }

            // Eligibility guarantees coordinates
            let Some((latitude, longitude)) = event.coordinates() else {
                continue;
            };
            let distance = haversine_distance(
                self.caller.latitude,
                self.caller.longitude,
                latitude,
                longitude,
            );
            self.pending.push_back((position, RankedEvent { event, distance }));
        }

        self.cursor += returned;
        self.rows_scanned += returned;

        if returned < u64::from(self.limits.batch_size) {
            self.stopped = Some(ScanStop::Exhausted);
        }

        tracing::debug!(
            "Round trip {}: {} rows, {} eligible, cursor now {}",
            self.round_trips,
            returned,
            self.pending.len() - before,
            self.cursor
        );

        Ok(())
    }

    /// Store position just past the last row read
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn stop_reason(&self) -> Option<ScanStop> {
        self.stopped
    }

    /// Whether eligible events are buffered but not yet taken
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn round_trips(&self) -> u32 {
        self.round_trips
    }

    pub fn rows_scanned(&self) -> u64 {
        self.rows_scanned
    }
}

/// Resolves once the scan deadline passes, never without one
async fn budget_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Fills a page of eligible events by over-fetching from the store
///
/// Stops when the page is full, the store is exhausted, or a scan cap is
/// hit. Events keep their discovery order; no distance sort is applied.
#[derive(Debug, Clone, Copy)]
pub struct PageAssembler {
    policy: PagingPolicy,
}

impl PageAssembler {
    pub fn new(policy: PagingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PagingPolicy {
        &self.policy
    }

    /// Rows requested per store read for a given page size
    #[inline]
    pub fn batch_size(&self, page_size: u32) -> u32 {
        page_size
            .max(1)
            .saturating_mul(self.policy.overfetch_multiplier.max(1))
    }

    /// Assemble one page starting at `offset`
    ///
    /// `has_more` is false only when the store is exhausted and no eligible
    /// event is left over; `next_offset` is `None` exactly then. A store
    /// error or cancellation fails the whole page.
    pub async fn assemble(
        &self,
        store: &dyn EventStore,
        caller: &CallerContext,
        offset: u64,
        page_size: u32,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<EventPage, PageError> {
        let limits = ScanLimits {
            batch_size: self.batch_size(page_size),
            max_round_trips: self.policy.max_round_trips.max(1),
            deadline: self.policy.scan_budget.map(|budget| Instant::now() + budget),
        };
        let mut source = EligibleEvents::new(store, caller, now, offset, limits, cancel);

        let target = page_size as usize;
        let mut events = Vec::with_capacity(target);
        let mut last_position = None;

        while events.len() < target {
            match source.next().await? {
                Some((position, event)) => {
                    last_position = Some(position);
                    events.push(event);
                }
                None => break,
            }
        }

        let drained = source.stop_reason() == Some(ScanStop::Exhausted) && !source.has_pending();
        let has_more = !drained;

        // Leftover eligible events are rediscovered by resuming right after
        // the last one returned
        let next_offset = match (has_more, source.has_pending(), last_position) {
            (false, _, _) => None,
            (true, true, Some(position)) => Some(position + 1),
            _ => Some(source.cursor()),
        };

        match source.stop_reason() {
            Some(ScanStop::RoundTripCap) | Some(ScanStop::ScanBudget) if events.len() < target => {
                tracing::warn!(
                    "Returning partial page for {}: {} of {} events after {} round trips ({:?})",
                    caller.user_id,
                    events.len(),
                    target,
                    source.round_trips(),
                    source.stop_reason()
                );
            }
            _ => {}
        }

        tracing::debug!(
            "Assembled page for {}: {} events, {} rows scanned in {} round trips",
            caller.user_id,
            events.len(),
            source.rows_scanned(),
            source.round_trips()
        );

        Ok(EventPage {
            events,
            has_more,
            next_offset,
        })
    }
}
