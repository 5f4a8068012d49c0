use crate::years::{last_index, year_at, Year, CATALOG, DEFAULT_INDEX};

/// First terminal column of the timeline track, room for the play button
/// and year label
pub const TRACK_OFFSET: u16 = 20;
/// Widest notch; narrower terminals get narrower notches
pub const MAX_TRACK_STEP: u16 = 3;

/// Position on the year timeline, always a valid catalog index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slider {
    index: usize,
}

impl Slider {
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(last_index()),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn year(&self) -> Year {
        CATALOG[self.index]
    }

    pub fn is_at_end(&self) -> bool {
        self.index == last_index()
    }

    /// Move to `index`, clamped to the catalog. Returns true if it moved.
    pub fn set(&mut self, index: usize) -> bool {
        let index = index.min(last_index());
        let moved = index != self.index;
        self.index = index;
        moved
    }

    /// Move by `delta` positions, stopping at either end
    pub fn step(&mut self, delta: i32) -> bool {
        let target = (self.index as i64 + delta as i64).max(0) as usize;
        self.set(target)
    }

    pub fn first(&mut self) -> bool {
        self.set(0)
    }

    pub fn last(&mut self) -> bool {
        self.set(last_index())
    }

    /// Position after this one, if any
    pub fn peek_next(&self) -> Option<(usize, Year)> {
        let next = self.index + 1;
        year_at(next).map(|year| (next, year))
    }
}

impl Default for Slider {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX)
    }
}

/// Horizontal layout of the timeline track for one terminal width.
/// Drawing and click handling both go through this, so they always agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Track {
    /// First column of the first notch
    pub offset: u16,
    /// Columns per catalog entry
    pub step: u16,
}

impl Track {
    /// Widest notches that fit every catalog entry in `width` columns.
    /// Below `TRACK_OFFSET + 26` columns the label area gives way first.
    pub fn fit(width: u16) -> Self {
        let entries = CATALOG.len() as u16;
        let step = (width.saturating_sub(TRACK_OFFSET) / entries).clamp(1, MAX_TRACK_STEP);
        let offset = TRACK_OFFSET.min(width.saturating_sub(entries));
        Self { offset, step }
    }

    /// Column just past the last notch
    pub fn end(&self) -> u16 {
        self.offset + CATALOG.len() as u16 * self.step
    }

    /// Catalog index under a terminal column, if the column is on the track
    pub fn index_at_column(&self, col: u16) -> Option<usize> {
        let offset = col.checked_sub(self.offset)?;
        let index = (offset / self.step) as usize;
        (index <= last_index()).then_some(index)
    }

    /// Column of the knob for a catalog index
    pub fn column_of_index(&self, index: usize) -> u16 {
        self.offset + index as u16 * self.step + self.step / 2
    }
}
