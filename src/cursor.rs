//! Segmented hydration cursor.
//!
//! The cursor pulls at most `segment_size` rows at a time from its
//! [`RowSource`], hydrates them as one batch and yields the root entities
//! one position at a time:
//!
//! ```text
//!  Unstarted ──rewind()──▶ Positioned ──next()──▶ Positioned ... ──▶ Exhausted
//!      │                       ▲                                      │
//!      └───────next()──────────┘                  rewind() ◀──────────┘
//! ```
//!
//! Superseded segments are dropped unless `retain_segments` is set, in
//! which case a later [`HydrationCursor::rewind`] replays them without
//! touching the source.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::allocate::EntityActivator;
use crate::config::SettingsError;
use crate::error::{HydrateError, HydrateResult};
use crate::hydrate::Hydrator;
use crate::model::Instance;
use crate::plan::HydrationPlan;
use crate::source::RowSource;

/// Default number of rows fetched and hydrated per segment.
pub const DEFAULT_SEGMENT_SIZE: usize = 100;

/// Cursor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationOptions {
    pub segment_size: usize,
    /// Keep every hydrated segment so the cursor can restart without
    /// re-querying the source.
    pub retain_segments: bool,
}

impl Default for HydrationOptions {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            retain_segments: false,
        }
    }
}

impl HydrationOptions {
    pub fn segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    pub fn retain_segments(mut self, retain: bool) -> Self {
        self.retain_segments = retain;
        self
    }
}

/// Root entities hydrated from one batch fetch.
#[derive(Debug)]
pub struct Segment {
    start: usize,
    entities: Vec<Box<dyn Instance>>,
}

impl Segment {
    /// Global index of the first entity.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the global index of the last entity.
    pub fn end(&self) -> usize {
        self.start + self.entities.len()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &dyn Instance> {
        self.entities.iter().map(|e| e.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unstarted,
    Positioned,
    Exhausted,
}

/// Lazy, forward-only iteration over hydrated root entities.
pub struct HydrationCursor<S, A> {
    hydrator: Hydrator,
    activator: A,
    source: S,
    options: HydrationOptions,
    state: CursorState,
    total: Option<usize>,
    position: usize,
    fetched: usize,
    segments: Vec<Segment>,
    current: usize,
    failed: bool,
}

impl<S: RowSource, A: EntityActivator> HydrationCursor<S, A> {
    /// Create a cursor over `source`. Nothing is fetched until the first
    /// [`rewind`](Self::rewind) or [`next`](Self::next).
    pub fn new(
        plan: HydrationPlan,
        activator: A,
        source: S,
        options: HydrationOptions,
    ) -> HydrateResult<Self> {
        if options.segment_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "segment_size must be greater than zero".to_string(),
            )
            .into());
        }

        Ok(Self {
            hydrator: Hydrator::new(plan),
            activator,
            source,
            options,
            state: CursorState::Unstarted,
            total: None,
            position: 0,
            fetched: 0,
            segments: Vec::new(),
            current: 0,
            failed: false,
        })
    }

    /// Move to position 0 and hydrate the first segment.
    ///
    /// The total row count is read once, on the first rewind, and stays
    /// fixed for the life of the cursor.
    pub fn rewind(&mut self) -> HydrateResult<()> {
        let result = self.try_rewind();
        self.track(result)
    }

    /// Advance one position, fetching the next segment when the current
    /// one is used up. Calling `next` on an unstarted cursor rewinds it.
    pub fn next(&mut self) -> HydrateResult<()> {
        match self.state {
            CursorState::Unstarted => self.rewind(),
            CursorState::Exhausted => Ok(()),
            CursorState::Positioned => {
                let result = self.try_advance();
                self.track(result)
            }
        }
    }

    /// The root entity at the current position.
    pub fn current(&self) -> Option<&dyn Instance> {
        if !self.valid() {
            return None;
        }
        let segment = self.segments.get(self.current)?;
        segment
            .entities
            .get(self.position - segment.start)
            .map(|e| e.as_ref())
    }

    /// Zero-based global index of the current entity.
    pub fn key(&self) -> Option<usize> {
        self.valid().then_some(self.position)
    }

    pub fn valid(&self) -> bool {
        self.state == CursorState::Positioned && self.position < self.total.unwrap_or(0)
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Global position, including one past the end once exhausted.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total row count, once known.
    pub fn total_count(&self) -> Option<usize> {
        self.total
    }

    /// Segments currently held in memory.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn options(&self) -> &HydrationOptions {
        &self.options
    }

    pub fn plan(&self) -> &HydrationPlan {
        self.hydrator.plan()
    }

    /// Stop iterating and close the source.
    pub fn close(&mut self) {
        if !self.source.is_closed() {
            self.source.close();
        }
        self.state = CursorState::Exhausted;
    }

    /// Consume the cursor into an iterator that hands out owned root
    /// entities, dropping each segment as it is drained.
    pub fn into_entities(mut self) -> Entities<S, A> {
        let mut pending = VecDeque::new();
        if self.valid() {
            let segments = std::mem::take(&mut self.segments);
            for (index, segment) in segments.into_iter().enumerate().skip(self.current) {
                let skip = if index == self.current {
                    self.position - segment.start
                } else {
                    0
                };
                pending.extend(segment.entities.into_iter().skip(skip));
            }
        }
        self.segments.clear();
        Entities {
            cursor: self,
            pending,
        }
    }

    fn try_rewind(&mut self) -> HydrateResult<()> {
        if self.can_replay() {
            tracing::debug!(segments = self.segments.len(), "replaying retained segments");
            self.position = 0;
            self.current = 0;
            self.state = CursorState::Positioned;
            return Ok(());
        }

        let total = self.restart()?;
        if total == 0 {
            self.finish();
            return Ok(());
        }
        self.fetch_segment()?;
        self.state = CursorState::Positioned;
        Ok(())
    }

    fn try_advance(&mut self) -> HydrateResult<()> {
        self.position += 1;
        if self.position >= self.total.unwrap_or(0) {
            self.finish();
            return Ok(());
        }

        let segment_end = self.segments.get(self.current).map_or(0, Segment::end);
        if self.position >= segment_end {
            if self.current + 1 < self.segments.len() {
                self.current += 1;
            } else {
                self.fetch_segment()?;
            }
        }
        Ok(())
    }

    fn can_replay(&self) -> bool {
        self.options.retain_segments
            && !self.failed
            && self.fetched > 0
            && self.segments.iter().map(Segment::len).sum::<usize>() == self.fetched
    }

    /// Reset the source to position 0 and drop all hydrated state.
    fn restart(&mut self) -> HydrateResult<usize> {
        self.source.reset()?;
        let total = match self.total {
            Some(total) => total,
            None => {
                let total = self.source.total_count()?;
                self.total = Some(total);
                total
            }
        };

        self.position = 0;
        self.fetched = 0;
        self.current = 0;
        self.failed = false;
        self.segments.clear();
        Ok(total)
    }

    fn finish(&mut self) {
        self.state = CursorState::Exhausted;
        if self.fetched >= self.total.unwrap_or(0) && !self.source.is_closed() {
            self.source.close();
        }
    }

    fn track<T>(&mut self, result: HydrateResult<T>) -> HydrateResult<T> {
        if result.is_err() {
            self.failed = true;
            self.state = CursorState::Exhausted;
        }
        result
    }

    fn fetch_segment(&mut self) -> HydrateResult<()> {
        let (start, entities) = self.load_batch()?;
        if !self.options.retain_segments {
            self.segments.clear();
        }
        self.segments.push(Segment { start, entities });
        self.current = self.segments.len() - 1;
        Ok(())
    }

    /// Fetch and hydrate the next batch without storing it.
    ///
    /// A short batch is still hydrated; the source only counts as
    /// truncated once a fetch comes back empty before the total is reached.
    fn load_batch(&mut self) -> HydrateResult<(usize, Vec<Box<dyn Instance>>)> {
        let total = self.total.unwrap_or(0);
        let wanted = self.options.segment_size.min(total.saturating_sub(self.fetched));

        let mut rows = self.source.fetch_next(wanted)?;
        if rows.is_empty() && wanted > 0 {
            return Err(HydrateError::SourceTruncated {
                expected: total,
                fetched: self.fetched,
            });
        }
        if rows.len() < wanted {
            tracing::warn!(wanted, got = rows.len(), fetched = self.fetched, total, "short batch from row source");
        }
        rows.truncate(wanted);

        let entities = self.hydrator.hydrate(rows, &self.activator)?;
        let start = self.fetched;
        self.fetched += entities.len();
        if self.fetched >= total && !self.source.is_closed() {
            self.source.close();
        }

        tracing::debug!(start, len = entities.len(), total, "hydrated segment");
        Ok((start, entities))
    }

    /// Next batch for [`Entities`]; `None` once every row was fetched.
    fn pull_batch(&mut self) -> HydrateResult<Option<Vec<Box<dyn Instance>>>> {
        if self.state == CursorState::Unstarted {
            self.restart()?;
            self.state = CursorState::Positioned;
        }
        if self.fetched >= self.total.unwrap_or(0) {
            self.finish();
            return Ok(None);
        }

        let (start, entities) = self.load_batch()?;
        self.position = start + entities.len();
        Ok(Some(entities))
    }
}

/// Owning iterator over hydrated root entities.
///
/// Yields one `Err` and then stops if a batch fails.
pub struct Entities<S, A> {
    cursor: HydrationCursor<S, A>,
    pending: VecDeque<Box<dyn Instance>>,
}

impl<S: RowSource, A: EntityActivator> Iterator for Entities<S, A> {
    type Item = HydrateResult<Box<dyn Instance>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entity) = self.pending.pop_front() {
                return Some(Ok(entity));
            }
            if self.cursor.state == CursorState::Exhausted {
                return None;
            }

            let result = self.cursor.pull_batch();
            match self.cursor.track(result) {
                Ok(Some(batch)) => self.pending.extend(batch),
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
