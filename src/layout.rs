//! Fixed screen geometry in logical pixels
//!
//! There is no layout engine: banner, tabs and editor pane sit at constant
//! positions, and tab hit zones are derived from the slot index.

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive on all four edges
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

pub const BANNER_POS: (f32, f32) = (10.0, 10.0);

pub const TAB_ORIGIN_X: f32 = 10.0;
pub const TAB_STRIDE: f32 = 150.0;
pub const TAB_WIDTH: f32 = 140.0;
pub const TAB_TOP: f32 = 80.0;
pub const TAB_BOTTOM: f32 = 110.0;

pub const EDITOR_PANE: Rect = Rect::new(10.0, 150.0, 780.0, 440.0);
/// Offset of the text line from the pane's top-left corner
pub const TEXT_INSET: f32 = 5.0;

/// Where the label of tab `index` is drawn
pub fn tab_label_pos(index: usize) -> (f32, f32) {
    (TAB_ORIGIN_X + TAB_STRIDE * index as f32, TAB_TOP)
}

/// Clickable zone of tab `index`
pub fn tab_hit_rect(index: usize) -> Rect {
    let (x, _) = tab_label_pos(index);
    Rect::new(x, TAB_TOP, TAB_WIDTH, TAB_BOTTOM - TAB_TOP)
}

/// Lowest-index tab among the first `tab_count` containing the point
pub fn tab_at(x: f32, y: f32, tab_count: usize) -> Option<usize> {
    (0..tab_count).find(|&i| tab_hit_rect(i).contains(x, y))
}

/// Top-left corner of the editor text line
pub fn text_origin() -> (f32, f32) {
    (EDITOR_PANE.x + TEXT_INSET, EDITOR_PANE.y + TEXT_INSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_zones() {
        assert_eq!(tab_hit_rect(0), Rect::new(10.0, 80.0, 140.0, 30.0));
        assert_eq!(tab_hit_rect(2), Rect::new(310.0, 80.0, 140.0, 30.0));
    }

    #[test]
    fn test_tab_at_edges_are_inclusive() {
        assert_eq!(tab_at(10.0, 80.0, 1), Some(0));
        assert_eq!(tab_at(150.0, 110.0, 1), Some(0));
        assert_eq!(tab_at(9.9, 90.0, 1), None);
        assert_eq!(tab_at(20.0, 110.5, 1), None);
    }

    #[test]
    fn test_gap_between_tabs() {
        // 150..160 separates tab 0 from tab 1
        assert_eq!(tab_at(155.0, 90.0, 2), None);
        assert_eq!(tab_at(160.0, 90.0, 2), Some(1));
    }

    #[test]
    fn test_tab_at_respects_count() {
        assert_eq!(tab_at(170.0, 90.0, 1), None);
        assert_eq!(tab_at(20.0, 90.0, 0), None);
    }

    #[test]
    fn test_text_origin() {
        assert_eq!(text_origin(), (15.0, 155.0));
    }
}
