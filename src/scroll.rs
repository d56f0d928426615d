//! Cursor-synchronized scrolling.
//!
//! Maps the editor's cursor position onto a scroll offset in the rendered
//! preview. The renderer tags every source line that starts a block with a
//! [`LineMarker`]; the synchronizer only ever reads those markers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Where the synchronized line lands inside the preview viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollMode {
    Top,
    #[default]
    Middle,
    Bottom,
    /// Synchronization disabled.
    None,
}

impl ScrollMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollMode::Top => "top",
            ScrollMode::Middle => "middle",
            ScrollMode::Bottom => "bottom",
            ScrollMode::None => "none",
        }
    }
}

impl fmt::Display for ScrollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScrollMode(pub String);

impl fmt::Display for UnknownScrollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scroll mode {:?}", self.0)
    }
}

impl std::error::Error for UnknownScrollMode {}

impl FromStr for ScrollMode {
    type Err = UnknownScrollMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(ScrollMode::Top),
            "middle" => Ok(ScrollMode::Middle),
            "bottom" => Ok(ScrollMode::Bottom),
            "none" => Ok(ScrollMode::None),
            _ => Err(UnknownScrollMode(s.to_string())),
        }
    }
}

/// Position of a rendered block in preview rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    pub top: usize,
    pub height: usize,
}

/// Lookup from source line to rendered position.
pub trait MarkerSource {
    fn marker_for_line(&self, line: usize) -> Option<LineMarker>;

    /// The marker for `line`, or for the closest earlier line that has one.
    fn nearest_marker(&self, line: usize) -> Option<LineMarker> {
        (0..=line).rev().find_map(|l| self.marker_for_line(l))
    }
}

/// Marker set produced by one render. Never mutated after the render
/// that built it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMarkers {
    by_line: BTreeMap<usize, LineMarker>,
}

impl LineMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a marker. The first block to claim a line keeps it. Blocks
    /// are recorded as they close, so the innermost block on a line wins.
    pub fn insert(&mut self, line: usize, marker: LineMarker) {
        self.by_line.entry(line).or_insert(marker);
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, LineMarker)> + '_ {
        self.by_line.iter().map(|(line, marker)| (*line, *marker))
    }
}

impl MarkerSource for LineMarkers {
    fn marker_for_line(&self, line: usize) -> Option<LineMarker> {
        self.by_line.get(&line).copied()
    }

    fn nearest_marker(&self, line: usize) -> Option<LineMarker> {
        self.by_line.range(..=line).next_back().map(|(_, m)| *m)
    }
}

/// The editor state a sync is computed from. Lines are 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub cursor_line: usize,
    pub window_line: usize,
    pub window_height: usize,
    pub total_lines: usize,
}

impl CursorSnapshot {
    /// Fraction of the editor window above the cursor, clamped to `[0, 1]`.
    pub fn window_ratio(&self) -> f64 {
        if self.window_height == 0 || self.total_lines <= 1 {
            return 0.0;
        }
        let above = self.cursor_line as f64 - self.window_line as f64;
        (above / self.window_height as f64).clamp(0.0, 1.0)
    }
}

/// Viewport fraction the target line should land at, or `None` when
/// synchronization is off.
pub fn alignment_ratio(mode: ScrollMode, cursor: &CursorSnapshot) -> Option<f64> {
    match mode {
        ScrollMode::Top => Some(0.0),
        ScrollMode::Bottom => Some(1.0),
        ScrollMode::Middle => Some(cursor.window_ratio()),
        ScrollMode::None => None,
    }
}

/// Computes the scroll offset (first visible row) that shows the cursor's
/// line at the requested alignment.
///
/// The first source line always maps to the top of the document and the
/// last to its end, whatever the alignment. Otherwise the point at `ratio`
/// of the marker's height is placed at `ratio` of the viewport. Lines
/// without a marker use the nearest earlier marker; with no such marker the
/// target is the top of the document. The result depends only on the
/// arguments, so repeating a call never drifts.
pub fn scroll_target<M: MarkerSource + ?Sized>(
    mode: ScrollMode,
    cursor: &CursorSnapshot,
    markers: &M,
    viewport_height: usize,
    content_height: usize,
) -> Option<usize> {
    let ratio = alignment_ratio(mode, cursor)?;
    if cursor.cursor_line == 0 {
        return Some(0);
    }
    if cursor.total_lines > 1 && cursor.cursor_line + 1 == cursor.total_lines {
        return Some(content_height.saturating_sub(viewport_height));
    }
    let Some(marker) = markers.nearest_marker(cursor.cursor_line) else {
        return Some(0);
    };

    let anchor = marker.top as f64 + marker.height as f64 * ratio;
    let target = anchor - viewport_height as f64 * ratio;
    Some(target.round().max(0.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(entries: &[(usize, usize, usize)]) -> LineMarkers {
        let mut set = LineMarkers::new();
        for &(line, top, height) in entries {
            set.insert(line, LineMarker { top, height });
        }
        set
    }

    fn cursor(cursor_line: usize, window_line: usize, window_height: usize, total_lines: usize) -> CursorSnapshot {
        CursorSnapshot {
            cursor_line,
            window_line,
            window_height,
            total_lines,
        }
    }

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("top".parse::<ScrollMode>(), Ok(ScrollMode::Top));
        assert_eq!("Middle".parse::<ScrollMode>(), Ok(ScrollMode::Middle));
        assert_eq!(" bottom ".parse::<ScrollMode>(), Ok(ScrollMode::Bottom));
        assert_eq!("none".parse::<ScrollMode>(), Ok(ScrollMode::None));
        assert!("relative".parse::<ScrollMode>().is_err());
    }

    #[test]
    fn middle_ratio_stays_in_unit_range() {
        for window_line in 0..5 {
            for window_height in 1..12 {
                for cursor_line in window_line..=window_line + window_height {
                    let r = cursor(cursor_line, window_line, window_height, 100).window_ratio();
                    assert!((0.0..=1.0).contains(&r), "ratio {r} out of range");
                }
            }
        }
    }

    #[test]
    fn ratio_is_zero_for_degenerate_windows() {
        assert_eq!(cursor(5, 0, 0, 100).window_ratio(), 0.0);
        assert_eq!(cursor(0, 0, 20, 1).window_ratio(), 0.0);
        assert_eq!(cursor(0, 0, 20, 0).window_ratio(), 0.0);
    }

    #[test]
    fn ratio_clamps_cursor_outside_window() {
        assert_eq!(cursor(2, 10, 20, 100).window_ratio(), 0.0);
        assert_eq!(cursor(90, 10, 20, 100).window_ratio(), 1.0);
    }

    #[test]
    fn middle_scenario_maps_midpoints() {
        let set = markers(&[(20, 60, 4)]);
        let c = cursor(20, 10, 20, 100);
        assert_eq!(c.window_ratio(), 0.5);
        // marker midpoint (62) sits at viewport midpoint (20 of 40)
        assert_eq!(scroll_target(ScrollMode::Middle, &c, &set, 40, 200), Some(42));
    }

    #[test]
    fn top_puts_marker_at_first_row() {
        let set = markers(&[(0, 0, 2), (7, 30, 3)]);
        assert_eq!(scroll_target(ScrollMode::Top, &cursor(7, 0, 20, 50), &set, 10, 200), Some(30));
        assert_eq!(scroll_target(ScrollMode::Top, &cursor(0, 0, 20, 50), &set, 10, 200), Some(0));
    }

    #[test]
    fn bottom_puts_marker_end_at_last_row() {
        let set = markers(&[(7, 30, 3)]);
        assert_eq!(scroll_target(ScrollMode::Bottom, &cursor(7, 0, 20, 50), &set, 10, 200), Some(23));
    }

    #[test]
    fn bottom_near_document_start_clamps_to_zero() {
        let set = markers(&[(1, 2, 1)]);
        assert_eq!(scroll_target(ScrollMode::Bottom, &cursor(1, 0, 20, 50), &set, 10, 200), Some(0));
    }

    #[test]
    fn first_line_pins_document_top() {
        // a heading that renders one row down still maps line 0 to row 0
        let set = markers(&[(0, 1, 2), (2, 4, 1)]);
        for mode in [ScrollMode::Top, ScrollMode::Middle, ScrollMode::Bottom] {
            assert_eq!(scroll_target(mode, &cursor(0, 0, 20, 50), &set, 10, 200), Some(0));
        }
    }

    #[test]
    fn last_line_pins_document_end() {
        let set = markers(&[(0, 0, 1), (49, 90, 2)]);
        for mode in [ScrollMode::Top, ScrollMode::Middle, ScrollMode::Bottom] {
            assert_eq!(scroll_target(mode, &cursor(49, 30, 20, 50), &set, 10, 120), Some(110));
        }
        assert_eq!(scroll_target(ScrollMode::Top, &cursor(49, 30, 20, 50), &set, 10, 5), Some(0));
    }

    #[test]
    fn none_never_scrolls() {
        let set = markers(&[(3, 9, 1)]);
        assert_eq!(scroll_target(ScrollMode::None, &cursor(3, 0, 10, 10), &set, 10, 200), None);
    }

    #[test]
    fn missing_marker_falls_back_to_preceding_line() {
        let set = markers(&[(2, 5, 3), (10, 40, 2)]);
        let c = cursor(8, 0, 20, 50);
        assert_eq!(set.marker_for_line(8), None);
        assert_eq!(scroll_target(ScrollMode::Top, &c, &set, 10, 200), Some(5));
    }

    #[test]
    fn no_preceding_marker_scrolls_to_top() {
        let set = markers(&[(10, 40, 2)]);
        assert_eq!(scroll_target(ScrollMode::Top, &cursor(3, 0, 20, 50), &set, 10, 200), Some(0));
        assert_eq!(scroll_target(ScrollMode::Middle, &cursor(3, 0, 20, 50), &LineMarkers::new(), 10, 200), Some(0));
    }

    #[test]
    fn cursor_past_shrunken_document_uses_last_marker() {
        let set = markers(&[(0, 0, 1), (3, 4, 2)]);
        let c = cursor(80, 70, 20, 5);
        assert_eq!(scroll_target(ScrollMode::Top, &c, &set, 10, 200), Some(4));
    }

    #[test]
    fn repeated_sync_is_idempotent() {
        let set = markers(&[(0, 0, 1), (12, 33, 5), (30, 80, 2)]);
        let c = cursor(14, 4, 25, 60);
        let first = scroll_target(ScrollMode::Middle, &c, &set, 18, 200);
        let second = scroll_target(ScrollMode::Middle, &c, &set, 18, 200);
        assert_eq!(first, second);
    }

    #[test]
    fn default_nearest_marker_walks_backwards() {
        struct Sparse;
        impl MarkerSource for Sparse {
            fn marker_for_line(&self, line: usize) -> Option<LineMarker> {
                (line == 4).then_some(LineMarker { top: 11, height: 1 })
            }
        }
        assert_eq!(Sparse.nearest_marker(9), Some(LineMarker { top: 11, height: 1 }));
        assert_eq!(Sparse.nearest_marker(3), None);
    }

    #[test]
    fn first_claim_on_a_line_wins() {
        let mut set = LineMarkers::new();
        set.insert(4, LineMarker { top: 10, height: 6 });
        set.insert(4, LineMarker { top: 10, height: 1 });
        assert_eq!(set.marker_for_line(4), Some(LineMarker { top: 10, height: 6 }));
        assert_eq!(set.iter().count(), 1);
    }
}
