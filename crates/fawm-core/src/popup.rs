//! Popup launcher menu state: placement and the hovered row.

use crate::geometry::{Geometry, Metrics};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupMenu {
    pub visible: bool,
    /// Placement of the menu window, border excluded.
    pub geometry: Geometry,
    /// Row under the pointer, if any.
    pub selected: Option<usize>,
}

impl PopupMenu {
    /// Menu size: the widest caption plus margins, one font row per item.
    pub const fn size(metrics: &Metrics, item_count: usize) -> (i32, i32) {
        (metrics.popup_width, metrics.font_height * item_count as i32)
    }

    /// Open the menu next to an anchor point in root coordinates.
    ///
    /// The menu opens one pixel below and to the right of the anchor, flipping
    /// to the left when it would overflow the screen width and above when it
    /// would overflow the height.
    pub fn place(&mut self, x: i32, y: i32, item_count: usize, metrics: &Metrics) -> Geometry {
        let (width, height) = Self::size(metrics, item_count);
        let mut menu_x = x;
        let mut menu_y = y + 1;
        if metrics.screen_width < menu_x + width {
            menu_x = x - width;
        }
        if metrics.screen_height < menu_y + height {
            menu_y = y - height - 1;
        }
        self.geometry = Geometry::new(menu_x, menu_y, width.max(0) as u32, height.max(0) as u32);
        self.visible = true;
        self.selected = None;
        self.geometry
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Row containing the root-relative point, if the point is on the menu.
    pub const fn item_at(&self, x: i32, y: i32, item_count: usize, metrics: &Metrics) -> Option<usize> {
        if !self.geometry.contains(x, y) || metrics.font_height <= 0 {
            return None;
        }
        let index = ((y - self.geometry.y) / metrics.font_height) as usize;
        if index >= item_count {
            return None;
        }
        Some(index)
    }

    /// Track the hovered row. Returns whether it changed and the menu needs
    /// repainting; a hidden menu never changes.
    pub fn highlight(&mut self, x: i32, y: i32, item_count: usize, metrics: &Metrics) -> bool {
        if !self.visible {
            return false;
        }
        let selected = self.item_at(x, y, item_count, metrics);
        if selected == self.selected {
            return false;
        }
        self.selected = selected;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics() -> Metrics {
        Metrics {
            font_height: 10,
            popup_width: 80,
            screen_width: 400,
            screen_height: 300,
            ..Metrics::default()
        }
    }

    #[test]
    fn test_place_below_right() {
        let mut p = PopupMenu::default();
        let g = p.place(50, 60, 3, &metrics());
        assert_eq!(g, Geometry::new(50, 61, 80, 30));
        assert!(p.visible);
        assert_eq!(p.selected, None);
    }

    #[test]
    fn test_place_flips_at_screen_edges() {
        let mut p = PopupMenu::default();
        let g = p.place(390, 290, 3, &metrics());
        assert_eq!(g, Geometry::new(310, 259, 80, 30));
    }

    #[test]
    fn test_item_at_rows() {
        let mut p = PopupMenu::default();
        let m = metrics();
        p.place(0, 0, 3, &m);
        assert_eq!(p.item_at(5, 1, 3, &m), Some(0));
        assert_eq!(p.item_at(5, 21, 3, &m), Some(2));
        assert_eq!(p.item_at(5, 31, 3, &m), None);
        assert_eq!(p.item_at(81, 5, 3, &m), None);
    }

    #[test]
    fn test_highlight_reports_changes_only() {
        let mut p = PopupMenu::default();
        let m = metrics();
        assert!(!p.highlight(5, 5, 3, &m));
        p.place(0, 0, 3, &m);
        assert!(p.highlight(5, 5, 3, &m));
        assert!(!p.highlight(6, 6, 3, &m));
        assert!(p.highlight(5, 15, 3, &m));
        assert_eq!(p.selected, Some(1));
        assert!(p.highlight(500, 500, 3, &m));
        assert_eq!(p.selected, None);
    }
}
