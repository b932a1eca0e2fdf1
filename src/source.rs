//! Row sources.
//!
//! A [`RowSource`] is a forward-only cursor over raw rows with a known
//! total. Sources close themselves once every announced row was fetched.

use crate::error::{HydrateError, HydrateResult};
use crate::model::Row;

/// Forward-only supplier of raw rows.
pub trait RowSource {
    /// Number of rows the source will deliver from position 0.
    fn total_count(&mut self) -> HydrateResult<usize>;

    /// Fetch up to `count` rows from the current position.
    fn fetch_next(&mut self, count: usize) -> HydrateResult<Vec<Row>>;

    /// Move back to position 0.
    fn reset(&mut self) -> HydrateResult<()>;

    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Column keys, when the source knows them.
    fn columns(&self) -> Option<&[String]> {
        None
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn total_count(&mut self) -> HydrateResult<usize> {
        (**self).total_count()
    }

    fn fetch_next(&mut self, count: usize) -> HydrateResult<Vec<Row>> {
        (**self).fetch_next(count)
    }

    fn reset(&mut self) -> HydrateResult<()> {
        (**self).reset()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn columns(&self) -> Option<&[String]> {
        (**self).columns()
    }
}

/// In-memory, rewindable rows.
#[derive(Debug, Clone, Default)]
pub struct VecRowSource {
    columns: Option<Vec<String>>,
    rows: Vec<Row>,
    position: usize,
    closed: bool,
}

impl VecRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl RowSource for VecRowSource {
    fn total_count(&mut self) -> HydrateResult<usize> {
        Ok(self.rows.len())
    }

    fn fetch_next(&mut self, count: usize) -> HydrateResult<Vec<Row>> {
        if self.closed {
            return Ok(Vec::new());
        }
        let end = self.rows.len().min(self.position + count);
        let batch = self.rows[self.position..end].to_vec();
        self.position = end;
        if self.position >= self.rows.len() {
            self.close();
        }
        Ok(batch)
    }

    fn reset(&mut self) -> HydrateResult<()> {
        self.position = 0;
        self.closed = false;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }
}

/// Forward-only rows drawn from an iterator with a known total.
///
/// Resetting is only possible before the first fetch.
pub struct IterRowSource<I> {
    rows: I,
    total: usize,
    fetched: usize,
    closed: bool,
}

impl<I: Iterator<Item = Row>> IterRowSource<I> {
    pub fn new(rows: I, total: usize) -> Self {
        Self {
            rows,
            total,
            fetched: 0,
            closed: false,
        }
    }
}

impl<I: ExactSizeIterator<Item = Row>> IterRowSource<I> {
    pub fn exact(rows: I) -> Self {
        let total = rows.len();
        Self::new(rows, total)
    }
}

impl<I: Iterator<Item = Row>> RowSource for IterRowSource<I> {
    fn total_count(&mut self) -> HydrateResult<usize> {
        Ok(self.total)
    }

    fn fetch_next(&mut self, count: usize) -> HydrateResult<Vec<Row>> {
        if self.closed {
            return Ok(Vec::new());
        }
        let batch: Vec<Row> = self.rows.by_ref().take(count).collect();
        self.fetched += batch.len();
        if self.fetched >= self.total || batch.len() < count {
            self.close();
        }
        Ok(batch)
    }

    fn reset(&mut self) -> HydrateResult<()> {
        if self.fetched > 0 {
            return Err(HydrateError::SourceNotRewindable);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
