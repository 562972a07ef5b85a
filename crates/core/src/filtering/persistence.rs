use std::collections::VecDeque;

/// Short-horizon spatial-recurrence filter that suppresses one-frame
/// flickers.
///
/// Candidate positions are quantized to coarse grid cells; a cell must
/// recur at least `min_hits` times within the bounded history window to
/// be accepted. A real face tends to sit in the same cell across
/// consecutive sampled frames, a spurious box does not. This is a cheap
/// proxy for tracking, deliberately not frame-to-frame association.
pub struct PersistenceFilter {
    history: VecDeque<(i64, i64)>,
    capacity: usize,
    grid_size: f64,
    min_hits: usize,
}

impl PersistenceFilter {
    pub fn new(grid_size: f64, min_hits: usize, capacity: usize) -> Self {
        debug_assert!(grid_size > 0.0);
        debug_assert!(capacity > 0);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            grid_size,
            min_hits,
        }
    }

    /// Records one accepted-candidate evaluation and decides acceptance.
    ///
    /// The push always happens before the decision, so the just-observed
    /// cell counts toward its own threshold. Oldest entries are dropped
    /// when the window is full.
    pub fn observe(&mut self, x: i32, y: i32) -> bool {
        let cell = self.cell_for(x, y);

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(cell);

        if self.min_hits <= 1 {
            return true;
        }
        self.history.iter().filter(|&&c| c == cell).count() >= self.min_hits
    }

    pub fn min_hits(&self) -> usize {
        self.min_hits
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    fn cell_for(&self, x: i32, y: i32) -> (i64, i64) {
        (
            (x as f64 / self.grid_size).round() as i64,
            (y as f64 / self.grid_size).round() as i64,
        )
    }
}
