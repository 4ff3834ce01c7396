//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout areas
pub struct MainLayout {
    pub tabs: Rect,
    pub list: Rect,
    pub detail: Rect,
    pub status: Rect,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Area inset by `margin` on every side, for full-screen overlays
pub fn inset(area: Rect, margin: u16) -> Rect {
    Rect::new(
        area.x + margin.min(area.width / 2),
        area.y + margin.min(area.height / 2),
        area.width.saturating_sub(margin * 2),
        area.height.saturating_sub(margin * 2),
    )
}

/// Calculate main screen layout
///
/// View tabs on top, the list and the card panel side by side, then a one
/// line status bar and the key hints.
pub fn calculate_main_layout(area: Rect) -> MainLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[1]);

    MainLayout {
        tabs: main_chunks[0],
        list: horizontal_chunks[0],
        detail: horizontal_chunks[1],
        status: main_chunks[2],
        help: main_chunks[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_small_area() {
        let area = Rect::new(0, 0, 30, 10);
        let popup = centered_popup(area, 60, 20);
        assert_eq!(popup, Rect::new(0, 0, 30, 10));

        let popup = centered_popup(Rect::new(0, 0, 100, 40), 60, 20);
        assert_eq!(popup, Rect::new(20, 10, 60, 20));
    }

    #[test]
    fn test_main_layout_splits_all_rows() {
        let layout = calculate_main_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.tabs.height, 2);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.help.height, 1);
        assert_eq!(layout.list.height, 36);
        assert_eq!(layout.list.width + layout.detail.width, 120);
    }
}
