use crate::model::TimeSeriesFrame;

/// Frames fetched so far plus the index of the one on screen.
///
/// The cursor follows each append, but callers may move it freely over the
/// frames already present while later slots are still being fetched.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    frames: Vec<TimeSeriesFrame>,
    active: usize,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame and makes it active. Returns its index.
    pub fn push(&mut self, frame: TimeSeriesFrame) -> usize {
        self.frames.push(frame);
        self.active = self.frames.len() - 1;
        self.active
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.active = 0;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[TimeSeriesFrame] {
        &self.frames
    }

    pub fn active(&self) -> Option<&TimeSeriesFrame> {
        self.frames.get(self.active)
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.frames.is_empty()).then_some(self.active)
    }

    /// Moves to `index` if it exists.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.frames.len() && index != self.active {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.select(self.active + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.active.checked_sub(1) {
            Some(index) => self.select(index),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(count: usize) -> TimeSeries {
        let mut series = TimeSeries::new();
        for idx in 0..count {
            series.push(TimeSeriesFrame::placeholder(&format!("t{}", idx)));
        }
        series
    }

    #[test]
    fn push_moves_cursor_to_newest() {
        let mut series = series(2);
        assert_eq!(series.active_index(), Some(1));
        series.select(0);
        series.push(TimeSeriesFrame::placeholder("t2"));
        assert_eq!(series.active_index(), Some(2));
        assert_eq!(series.active().unwrap().timestamp, "t2");
    }

    #[test]
    fn navigation_is_clamped() {
        let mut series = series(3);
        assert!(!series.next());
        assert!(series.previous());
        assert!(series.previous());
        assert!(!series.previous());
        assert_eq!(series.active_index(), Some(0));
        assert!(!series.select(7));
        assert_eq!(series.active_index(), Some(0));
    }

    #[test]
    fn empty_series_has_no_active_frame() {
        let mut series = TimeSeries::new();
        assert!(series.active().is_none());
        assert_eq!(series.active_index(), None);
        assert!(!series.next());
        series = self::series(1);
        series.clear();
        assert!(series.is_empty());
    }
}
