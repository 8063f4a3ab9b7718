use std::cmp::min;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Frames cycled by the loading indicator.
const SPINNER: &[&str] = &["|", "/", "-", "\\"];

/// Spinner glyph for the given UI tick.
pub(crate) fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Range of list indices to draw so `selected` stays visible when only
/// `capacity` cards fit.
pub(crate) fn visible_window(selected: usize, capacity: usize, len: usize) -> (usize, usize) {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    (start, min(start + capacity, len))
}

/// Column for a cursor `offset` characters into `area`, kept inside it.
pub(crate) fn cursor_column(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let last = area.right().saturating_sub(1).max(area.x);
    area.x.saturating_add(offset).min(last)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_wraps_around() {
        assert_eq!(spinner_frame(0), "|");
        assert_eq!(spinner_frame(SPINNER.len()), "|");
        assert_eq!(spinner_frame(1), "/");
    }

    #[test]
    fn window_scrolls_with_selection() {
        assert_eq!(visible_window(0, 3, 10), (0, 3));
        assert_eq!(visible_window(2, 3, 10), (0, 3));
        assert_eq!(visible_window(3, 3, 10), (1, 4));
        assert_eq!(visible_window(9, 3, 10), (7, 10));
    }

    #[test]
    fn window_handles_short_lists() {
        assert_eq!(visible_window(0, 5, 2), (0, 2));
        assert_eq!(visible_window(0, 0, 0), (0, 0));
    }

    #[test]
    fn cursor_column_is_clamped_to_area() {
        let area = Rect::new(10, 0, 20, 3);
        assert_eq!(cursor_column(area, 5), 15);
        assert_eq!(cursor_column(area, 19), 29);
        assert_eq!(cursor_column(area, 500), 29);
        assert_eq!(cursor_column(area, usize::MAX), 29);
        assert_eq!(cursor_column(Rect::new(65_530, 0, 5, 1), 100), 65_534);
        assert_eq!(cursor_column(Rect::new(4, 0, 0, 1), 3), 4);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
    }
}
