use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::panel::{Panel, PanelType};

const TOPBAR_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;
const MIN_MODAL_WIDTH: u16 = 48;
const MIN_MODAL_HEIGHT: u16 = 9;
/// Border plus one column of padding on each side.
const MODAL_CHROME_X: u16 = 4;
/// Top and bottom border; headings and hints live in the border titles.
const MODAL_CHROME_Y: u16 = 2;

#[derive(Default)]
pub struct LayoutState {
    cached_panels: Vec<Panel>,
    modal: Option<Rect>,
}

impl LayoutState {
    pub fn calculate_layout(&mut self, area: Rect) -> &[Panel] {
        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TOPBAR_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.cached_panels = vec![
            Panel {
                panel_type: PanelType::Topbar,
                rect: main_layout[0],
            },
            Panel {
                panel_type: PanelType::Shop,
                rect: main_layout[1],
            },
            Panel {
                panel_type: PanelType::Footer,
                rect: main_layout[2],
            },
        ];

        &self.cached_panels
    }

    pub fn get_panels(&self) -> &[Panel] {
        &self.cached_panels
    }

    /// Places the modal for a body of `content` columns and rows.
    pub fn place_modal(&mut self, area: Rect, content: (u16, u16)) -> Rect {
        let (width, height) = modal_size(content);
        let width = width.min(area.width);
        let height = height.min(area.height);
        let rect = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        self.modal = Some(rect);
        rect
    }

    pub fn clear_modal(&mut self) {
        self.modal = None;
    }

    /// True when a click at (`x`, `y`) lands on the backdrop around the modal.
    pub fn is_backdrop(&self, x: u16, y: u16) -> bool {
        self.modal.is_some_and(|modal| {
            x < modal.x || y < modal.y || x >= modal.x + modal.width || y >= modal.y + modal.height
        })
    }
}

/// Outer size of a modal holding `content`, before clamping to the screen.
pub fn modal_size(content: (u16, u16)) -> (u16, u16) {
    (
        content.0.saturating_add(MODAL_CHROME_X).max(MIN_MODAL_WIDTH),
        content.1.saturating_add(MODAL_CHROME_Y).max(MIN_MODAL_HEIGHT),
    )
}

/// True when `content` fits a modal on `area` without being cut.
pub fn modal_fits(area: Rect, content: (u16, u16)) -> bool {
    let (width, height) = modal_size(content);
    width <= area.width && height <= area.height
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
