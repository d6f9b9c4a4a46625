//! Taskbar presentation state: clock throttling and the window list.
//!
//! The bar is `taskbar_height` tall along the bottom of the screen. A square
//! menu button sits at the left, the clock at the right, and the window list
//! shares the space between them equally.

use chrono::{DateTime, TimeZone};

use crate::frame::FrameId;
use crate::geometry::Metrics;

/// `strftime` pattern of the clock text.
pub const CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Widest text [`CLOCK_FORMAT`] can produce, for measuring with a fixed font.
pub const CLOCK_SAMPLE: &str = "0000-00-00T00:00";

pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(CLOCK_FORMAT).to_string()
}

#[derive(Debug, Clone, Default)]
pub struct Taskbar {
    /// Minute shown by the last clock redraw.
    last_minute: Option<i64>,
}

impl Taskbar {
    /// Whether the clock text changed since the last redraw. Records `now`
    /// when it did.
    pub fn should_redraw_clock(&mut self, now_secs: i64) -> bool {
        let minute = now_secs.div_euclid(60);
        if self.last_minute == Some(minute) {
            return false;
        }
        self.last_minute = Some(minute);
        true
    }
}

/// One window-list slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub frame: FrameId,
    pub x: i32,
    pub width: i32,
    /// Drawn highlighted: this frame is on top of the stacking order.
    pub focused: bool,
}

/// What a click at taskbar-local `x` lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarHit {
    MenuButton,
    Entry(usize),
    Nothing,
}

/// Width of each window-list slot. The remainder of the division is left
/// unused at the right end.
pub const fn item_width(metrics: &Metrics, count: usize) -> i32 {
    if count == 0 {
        return 0;
    }
    let list_right = metrics.clock_x() - metrics.padding;
    (list_right - metrics.taskbar_height()) / count as i32
}

/// Window-list slots for `frames`, in creation order.
pub fn layout(
    frames: impl ExactSizeIterator<Item = FrameId>,
    top: Option<FrameId>,
    metrics: &Metrics,
) -> Vec<TaskbarEntry> {
    let width = item_width(metrics, frames.len());
    let start = metrics.taskbar_height();
    frames
        .enumerate()
        .map(|(i, frame)| TaskbarEntry {
            frame,
            x: start + width * i as i32,
            width,
            focused: top == Some(frame),
        })
        .collect()
}

/// Classify a click. Slots are found with the same arithmetic [`layout`]
/// draws them with; clicks in the unused remainder select the last slot.
pub const fn hit(x: i32, count: usize, metrics: &Metrics) -> TaskbarHit {
    if metrics.clock_x() < x {
        return TaskbarHit::Nothing;
    }
    let start = metrics.taskbar_height();
    if x < start {
        return TaskbarHit::MenuButton;
    }
    if count == 0 {
        return TaskbarHit::Nothing;
    }
    let width = item_width(metrics, count);
    let last = count - 1;
    if width <= 0 {
        return TaskbarHit::Entry(last);
    }
    let index = ((x - start) / width) as usize;
    TaskbarHit::Entry(if index > last { last } else { index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics() -> Metrics {
        Metrics {
            font_height: 12,
            title_height: 12,
            padding: 4,
            screen_width: 1000,
            screen_height: 700,
            clock_width: 96,
            ..Metrics::default()
        }
    }

    #[test]
    fn test_clock_redraws_once_per_minute() {
        let mut bar = Taskbar::default();
        assert!(bar.should_redraw_clock(120));
        assert!(!bar.should_redraw_clock(121));
        assert!(!bar.should_redraw_clock(179));
        assert!(bar.should_redraw_clock(180));
        assert!(!bar.should_redraw_clock(180));
    }

    #[test]
    fn test_format_clock() {
        let t = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(format_clock(&t), "2024-03-09T07:05");
        assert_eq!(format_clock(&t).len(), CLOCK_SAMPLE.len());
    }

    #[test]
    fn test_layout_divides_list_area() {
        let m = metrics();
        // taskbar 20 tall, clock at 1000 - 96 - 4 = 900, list ends at 896.
        let entries = layout([FrameId(1), FrameId(2), FrameId(3)].into_iter(), Some(FrameId(2)), &m);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].x, 20);
        assert_eq!(entries[0].width, 292);
        assert_eq!(entries[2].x, 20 + 2 * 292);
        assert!(entries[1].focused);
        assert!(!entries[0].focused);
    }

    #[test]
    fn test_hit_zones() {
        let m = metrics();
        assert_eq!(hit(5, 3, &m), TaskbarHit::MenuButton);
        assert_eq!(hit(20, 3, &m), TaskbarHit::Entry(0));
        assert_eq!(hit(20 + 292, 3, &m), TaskbarHit::Entry(1));
        assert_eq!(hit(895, 3, &m), TaskbarHit::Entry(2));
        assert_eq!(hit(899, 3, &m), TaskbarHit::Entry(2));
        assert_eq!(hit(901, 3, &m), TaskbarHit::Nothing);
        assert_eq!(hit(100, 0, &m), TaskbarHit::Nothing);
        assert_eq!(hit(5, 0, &m), TaskbarHit::MenuButton);
    }
}
