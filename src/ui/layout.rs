use ratatui::layout::{Constraint, Flex, Layout, Rect};

pub struct AppLayout {
    pub request_row: RequestInputLayout,
    pub response_area: Rect,
    pub status_bar: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::vertical([
            Constraint::Length(3), // Input row (method + url)
            Constraint::Min(1),    // Response
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        Self {
            request_row: RequestInputLayout::new(vertical[0]),
            response_area: vertical[1],
            status_bar: vertical[2],
        }
    }
}

/// Layout for the horizontal request input row: [Method] [URL]
pub struct RequestInputLayout {
    pub method_area: Rect,
    pub url_area: Rect,
}

impl RequestInputLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::horizontal([
            Constraint::Length(10), // Method: fits "DELETE" + padding
            Constraint::Min(1),     // URL: fill remaining space
        ])
        .split(area);

        Self {
            method_area: chunks[0],
            url_area: chunks[1],
        }
    }
}

/// A `width` x `height` rectangle centred in `area`, clamped to its size.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_layout_rows() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.request_row.method_area.height, 3);
        assert_eq!(layout.request_row.method_area.width, 10);
        assert_eq!(layout.request_row.url_area.width, 70);
        assert_eq!(layout.response_area.height, 20);
        assert_eq!(layout.status_bar.y, 23);
    }

    #[test]
    fn test_centered_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered(area, 10, 4);
        assert_eq!((popup.width, popup.height), (10, 4));
        assert_eq!((popup.x, popup.y), (5, 3));

        let clamped = centered(area, 50, 50);
        assert_eq!((clamped.width, clamped.height), (20, 10));
    }
}
