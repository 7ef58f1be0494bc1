//! Reel strip: the fixed pool of visual items and its wrap-around band
//!
//! Items are spaced one `item_height` apart inside a virtual band of height
//! `item_height × count`, symmetric about the center line. Items that fall
//! below the band's bottom edge are moved back on top, so a handful of items
//! scroll forever.

/// Translations smaller than this are skipped (no move, no recycle)
pub const MIN_TRANSLATION: f32 = 0.0001;

/// One symbol-bearing item on a reel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualItem {
    /// Position along the scroll axis (up is positive)
    pub offset: f32,
    /// Index into the symbol catalog (None while the catalog is empty)
    pub symbol: Option<usize>,
}

/// Fixed pool of items with wrap-around recycling
#[derive(Debug, Clone)]
pub struct ReelStrip {
    items: Vec<VisualItem>,
    item_height: f32,
    center_line: f32,
}

impl ReelStrip {
    /// Lay out `count` items top-down, centered on `center_line`
    pub fn new(count: usize, item_height: f32, center_line: f32) -> Self {
        let top = band_top(count, item_height, center_line);
        let items = (0..count)
            .map(|i| VisualItem {
                offset: top - i as f32 * item_height,
                symbol: None,
            })
            .collect();

        Self {
            items,
            item_height,
            center_line,
        }
    }

    pub fn items(&self) -> &[VisualItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [VisualItem] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn center_line(&self) -> f32 {
        self.center_line
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BAND EDGES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Top edge of the band (offset of the highest slot)
    pub fn recycle_top(&self) -> f32 {
        band_top(self.items.len(), self.item_height, self.center_line)
    }

    /// Bottom edge; items strictly below it get recycled
    pub fn recycle_bottom(&self) -> f32 {
        2.0 * self.center_line - self.recycle_top()
    }

    /// Highest item offset, seeded one item below the band's top edge
    pub fn topmost_offset(&self) -> f32 {
        self.items
            .iter()
            .map(|item| item.offset)
            .fold(self.recycle_top() - self.item_height, f32::max)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MOTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Move every item down by `delta`, recycling as items leave the band.
    ///
    /// Large deltas are applied in steps of at most one item height so the
    /// topmost item never drops below the recycle seed and the band stays
    /// contiguous after a frame hitch. `on_recycle` runs once for each item
    /// moved back on top. Returns the number of recycled items.
    pub fn move_down<F>(&mut self, delta: f32, mut on_recycle: F) -> usize
    where
        F: FnMut(&mut VisualItem),
    {
        if delta.abs() <= MIN_TRANSLATION || !delta.is_finite() {
            return 0;
        }

        let step_limit = self.item_height.max(MIN_TRANSLATION);
        let mut remaining = delta;
        let mut recycled = 0;

        while remaining.abs() > MIN_TRANSLATION {
            let step = remaining.clamp(-step_limit, step_limit);
            remaining -= step;

            for item in &mut self.items {
                item.offset -= step;
            }
            recycled += self.recycle(&mut on_recycle);
        }

        recycled
    }

    /// Reposition every item below the band on top of the current highest
    /// item, stacking multiple recycles contiguously.
    pub fn recycle<F>(&mut self, mut on_recycle: F) -> usize
    where
        F: FnMut(&mut VisualItem),
    {
        let mut highest = self.topmost_offset();
        let bottom = self.recycle_bottom();
        let mut recycled = 0;

        for item in &mut self.items {
            if item.offset < bottom {
                item.offset = highest + self.item_height;
                highest = item.offset;
                on_recycle(item);
                recycled += 1;
            }
        }

        if recycled > 0 {
            log::trace!("recycled {recycled} item(s), top now {highest}");
        }
        recycled
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SNAP SUPPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Index of the item closest to the center line (first minimum wins)
    pub fn nearest_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, item) in self.items.iter().enumerate() {
            let distance = (item.offset - self.center_line).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Offset of the item closest to the center line, 0.0 when empty
    pub fn nearest_offset(&self) -> f32 {
        self.nearest_index()
            .map_or(0.0, |i| self.items[i].offset)
    }

    /// True when sorted offsets are exactly one item height apart
    pub fn is_contiguous(&self, tolerance: f32) -> bool {
        let mut offsets: Vec<f32> = self.items.iter().map(|i| i.offset).collect();
        offsets.sort_by(f32::total_cmp);
        offsets
            .windows(2)
            .all(|w| ((w[1] - w[0]) - self.item_height).abs() <= tolerance)
    }
}

fn band_top(count: usize, item_height: f32, center_line: f32) -> f32 {
    if count == 0 {
        return center_line;
    }
    center_line + item_height * (count - 1) as f32 * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn strip_5x220() -> ReelStrip {
        ReelStrip::new(5, 220.0, 0.0)
    }

    #[test]
    fn test_initial_layout_is_centered() {
        let strip = strip_5x220();
        let offsets: Vec<f32> = strip.items().iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![440.0, 220.0, 0.0, -220.0, -440.0]);
        assert_eq!(strip.recycle_top(), 440.0);
        assert_eq!(strip.recycle_bottom(), -440.0);
        assert!(strip.is_contiguous(1e-3));
    }

    #[test]
    fn test_band_follows_center_line() {
        let strip = ReelStrip::new(3, 100.0, 50.0);
        assert_eq!(strip.recycle_top(), 150.0);
        assert_eq!(strip.recycle_bottom(), -50.0);
        assert_eq!(strip.items()[1].offset, 50.0);
    }

    #[test]
    fn test_small_translation_is_skipped() {
        let mut strip = strip_5x220();
        let mut hits = 0;
        assert_eq!(strip.move_down(0.00005, |_| hits += 1), 0);
        assert_eq!(strip.items()[0].offset, 440.0);
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_recycle_moves_item_on_top() {
        let mut strip = strip_5x220();
        let mut hits = 0;
        let recycled = strip.move_down(10.0, |_| hits += 1);

        assert_eq!(recycled, 1);
        assert_eq!(hits, 1);
        // bottom item (-450) went above the highest (430)
        assert_abs_diff_eq!(strip.items()[4].offset, 650.0);
        assert!(strip.is_contiguous(1e-3));
    }

    #[test]
    fn test_recycle_pass_stacks_items() {
        let mut strip = strip_5x220();
        for (item, offset) in strip.items_mut().iter_mut().zip([300.0, 80.0, -460.0, -500.0, -140.0]) {
            item.offset = offset;
        }

        let recycled = strip.recycle(|_| {});

        assert_eq!(recycled, 2);
        assert_abs_diff_eq!(strip.items()[2].offset, 520.0);
        assert_abs_diff_eq!(strip.items()[3].offset, 740.0);
    }

    #[test]
    fn test_large_delta_stays_contiguous() {
        let mut strip = strip_5x220();
        let recycled = strip.move_down(500.0, |_| {});

        assert_eq!(recycled, 3);
        assert_eq!(strip.len(), 5);
        assert_abs_diff_eq!(strip.topmost_offset(), 600.0, epsilon = 1e-3);
        assert!(strip.is_contiguous(1e-3));
    }

    #[test]
    fn test_count_never_changes() {
        let mut strip = strip_5x220();
        for step in 0..1000 {
            strip.move_down(37.0 + (step % 13) as f32, |_| {});
            assert_eq!(strip.len(), 5);
            assert!(strip.is_contiguous(0.01));
        }
    }

    #[test]
    fn test_upward_snap_correction_keeps_items() {
        let mut strip = strip_5x220();
        let recycled = strip.move_down(-30.0, |_| {});
        assert_eq!(recycled, 0);
        assert_abs_diff_eq!(strip.items()[2].offset, 30.0);
    }

    #[test]
    fn test_nearest_first_minimum_wins() {
        let mut strip = ReelStrip::new(2, 220.0, 0.0);
        // offsets 110 and -110: equal distance, first encountered wins
        assert_eq!(strip.nearest_index(), Some(0));
        assert_abs_diff_eq!(strip.nearest_offset(), 110.0);

        strip.items_mut()[1].offset = -100.0;
        assert_eq!(strip.nearest_index(), Some(1));
    }

    #[test]
    fn test_nearest_empty_is_zero() {
        let strip = ReelStrip::new(0, 220.0, 0.0);
        assert!(strip.is_empty());
        assert_eq!(strip.nearest_index(), None);
        assert_eq!(strip.nearest_offset(), 0.0);
        assert_eq!(strip.recycle_top(), 0.0);
    }
}
