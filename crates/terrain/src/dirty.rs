//! Bounding-rectangle dirty tracking for paint batches.
//!
//! A single rectangle is merged with min/max instead of maintaining a set of
//! dirty chunks. Merging is O(1) per edit; the cost is that two distant edits in
//! one batch dirty everything between them.

/// Inclusive rectangle in cell (or vertex) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl CellRect {
    pub fn new(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    pub fn single(x: usize, y: usize) -> Self {
        Self::new(x, y, x, y)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn union(&self, other: &CellRect) -> CellRect {
        CellRect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `by` on every side, saturating at zero.
    pub fn expand(&self, by: usize) -> CellRect {
        CellRect {
            min_x: self.min_x.saturating_sub(by),
            min_y: self.min_y.saturating_sub(by),
            max_x: self.max_x.saturating_add(by),
            max_y: self.max_y.saturating_add(by),
        }
    }

    /// Clip against `[0, max_x] x [0, max_y]`. `None` when nothing remains.
    pub fn clamp_to(&self, max_x: usize, max_y: usize) -> Option<CellRect> {
        if self.min_x > max_x || self.min_y > max_y {
            return None;
        }
        Some(CellRect {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x.min(max_x),
            max_y: self.max_y.min(max_y),
        })
    }

    /// Row-major iterator over every (x, y) inside the rectangle.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let rect = *self;
        (rect.min_y..=rect.max_y)
            .flat_map(move |y| (rect.min_x..=rect.max_x).map(move |x| (x, y)))
    }
}

/// Accumulates the touched rectangle of a batch, expanded by one cell per edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyRegion {
    rect: Option<CellRect>,
}

impl DirtyRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit at (x, y) together with its one-cell neighborhood.
    pub fn include(&mut self, x: usize, y: usize) {
        let cell = CellRect::single(x, y).expand(1);
        self.include_rect(cell);
    }

    /// Merge an already-expanded rectangle.
    pub fn include_rect(&mut self, rect: CellRect) {
        self.rect = Some(match self.rect {
            Some(current) => current.union(&rect),
            None => rect,
        });
    }

    pub fn include_all<'a>(&mut self, coords: impl IntoIterator<Item = &'a (usize, usize)>) {
        for &(x, y) in coords {
            self.include(x, y);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_none()
    }

    /// Current rectangle without clamping.
    #[inline]
    pub fn rect(&self) -> Option<CellRect> {
        self.rect
    }

    /// Take the rectangle clipped to `[0, max_x] x [0, max_y]` and reset to empty.
    pub fn take_clamped(&mut self, max_x: usize, max_y: usize) -> Option<CellRect> {
        self.rect.take().and_then(|r| r.clamp_to(max_x, max_y))
    }

    pub fn clear(&mut self) {
        self.rect = None;
    }
}
