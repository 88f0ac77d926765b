// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paginated, filtered browser over archived lists.
//!
//! The browser owns a 1-based page cursor, an append-only entry buffer,
//! and the filter state (search text, period preset, custom date pair).
//! Any filter change resets the buffer before the next fetch; pages are
//! only ever appended under one unchanged filter set.
//!
//! Each reset bumps a generation counter. A fetch carries the generation
//! it started under, and its result is discarded wholesale when the
//! counter moved on, so a superseded response can never overwrite newer
//! state.

use cesta_api::{ApiClient, HistoryQuery};
use cesta_core::{CestaError, HistoryEntry, HistoryPage, Period};
use chrono::NaiveDate;
use tracing::debug;

/// Where the browser stands between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPhase {
    /// Nothing fetched under the current filters yet.
    Idle,
    /// A page request is in flight.
    Loading,
    /// At least one page loaded; the server reports more.
    LoadedWithMore,
    /// All pages under the current filters are buffered.
    LoadedComplete,
}

/// A fetch that has been admitted but not yet applied.
#[derive(Debug)]
struct PendingLoad {
    generation: u64,
    prior: HistoryPhase,
    query: HistoryQuery,
}

/// Cursor-paginated view over finalized lists.
#[derive(Debug)]
pub struct HistoryBrowser {
    client: ApiClient,
    page_size: u32,
    phase: HistoryPhase,
    entries: Vec<HistoryEntry>,
    /// 1-based page the next fetch will request.
    next_page: u32,
    /// Bumped on every reset; stale completions are discarded.
    generation: u64,
    search: String,
    period: Period,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl HistoryBrowser {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            phase: HistoryPhase::Idle,
            entries: Vec::new(),
            next_page: 1,
            generation: 0,
            search: String::new(),
            period: Period::All,
            from: None,
            to: None,
        }
    }

    pub fn phase(&self) -> HistoryPhase {
        self.phase
    }

    /// The accumulated entries, oldest page first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.from, self.to)
    }

    /// True when a further [`load_more`](Self::load_more) would fetch.
    pub fn can_load_more(&self) -> bool {
        matches!(self.phase, HistoryPhase::Idle | HistoryPhase::LoadedWithMore)
    }

    /// Clears the buffer and cursor and invalidates any in-flight fetch.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.next_page = 1;
        self.generation += 1;
        self.phase = HistoryPhase::Idle;
    }

    /// Updates the search text, resetting the buffer when it changed.
    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = search.into();
        if search == self.search {
            return false;
        }
        self.search = search;
        self.reset();
        true
    }

    /// Updates the period preset, resetting the buffer when it changed.
    /// Dates of a previous custom range are kept; they only travel with
    /// [`Period::Custom`].
    pub fn set_period(&mut self, period: Period) -> bool {
        if period == self.period {
            return false;
        }
        self.period = period;
        self.reset();
        true
    }

    /// Updates the custom range start, resetting the buffer when changed.
    pub fn set_from(&mut self, from: Option<NaiveDate>) -> bool {
        if from == self.from {
            return false;
        }
        self.from = from;
        self.reset();
        true
    }

    /// Updates the custom range end, resetting the buffer when changed.
    pub fn set_to(&mut self, to: Option<NaiveDate>) -> bool {
        if to == self.to {
            return false;
        }
        self.to = to;
        self.reset();
        true
    }

    /// Fetches the next page and appends it to the buffer.
    ///
    /// Returns `Ok(false)` without a network call when a fetch is already
    /// in flight, when the buffer is complete, or when the response turned
    /// out to be superseded by a reset. An incomplete custom date range is
    /// a validation error and never reaches the network.
    pub async fn load_more(&mut self) -> Result<bool, CestaError> {
        let Some(pending) = self.begin_load()? else {
            return Ok(false);
        };
        let result = self.client.history(&pending.query).await;
        self.complete_load(pending, result)
    }

    /// Admits a fetch: guards, validation, then the in-flight transition.
    fn begin_load(&mut self) -> Result<Option<PendingLoad>, CestaError> {
        match self.phase {
            HistoryPhase::Loading | HistoryPhase::LoadedComplete => return Ok(None),
            HistoryPhase::Idle | HistoryPhase::LoadedWithMore => {}
        }
        if self.period == Period::Custom && (self.from.is_none() || self.to.is_none()) {
            return Err(CestaError::Validation(
                "a custom period needs both a start and an end date".to_string(),
            ));
        }

        let pending = PendingLoad {
            generation: self.generation,
            prior: self.phase,
            query: HistoryQuery {
                page: self.next_page,
                limit: self.page_size,
                period: self.period,
                search: self.search.clone(),
                from: self.from,
                to: self.to,
            },
        };
        self.phase = HistoryPhase::Loading;
        Ok(Some(pending))
    }

    /// Applies a fetch result. A result whose generation no longer matches
    /// is dropped entirely; a failed fetch restores the prior phase so the
    /// user can retry.
    fn complete_load(
        &mut self,
        pending: PendingLoad,
        result: Result<HistoryPage, CestaError>,
    ) -> Result<bool, CestaError> {
        if pending.generation != self.generation {
            debug!(page = pending.query.page, "discarding superseded history page");
            return Ok(false);
        }

        match result {
            Ok(page) => {
                self.next_page = page.meta.page + 1;
                self.phase = if page.meta.has_more {
                    HistoryPhase::LoadedWithMore
                } else {
                    HistoryPhase::LoadedComplete
                };
                self.entries.extend(page.entries);
                Ok(true)
            }
            Err(e) => {
                self.phase = pending.prior;
                Err(e)
            }
        }
    }
}
