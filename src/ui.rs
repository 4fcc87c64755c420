use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Padding},
    Frame,
};

use crate::app::{App, STATUS_HEIGHT};
use crate::components::content::ContentWidget;
use crate::components::help::HelpOverlay;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

/// Render the application UI.
///
/// Pane sizes come from the last `App::resize`, so drawing never changes state.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    if area.height == 0 || area.width == 0 {
        return;
    }

    let status_height = (STATUS_HEIGHT as u16).min(area.height);
    let body_height = area.height - status_height;
    let tree_width = (app.tree_width as u16).min(area.width);

    let tree_area = Rect::new(area.x, area.y, tree_width, body_height);
    let content_area = Rect::new(
        area.x + tree_width,
        area.y,
        area.width - tree_width,
        body_height,
    );
    let status_area = Rect::new(area.x, area.y + body_height, area.width, status_height);

    if let (Some(tree), true) = (app.tree.as_ref(), tree_width > 0) {
        let focused = app.tree_focused();
        let border_fg = if focused {
            app.theme.border_focused_fg
        } else {
            app.theme.border_fg
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(border_fg))
            .padding(Padding::horizontal(1));
        let widget = TreeWidget::new(tree, &app.theme)
            .focused(focused)
            .block(block);
        frame.render_widget(widget, tree_area);
    }

    let content = ContentWidget::new(&app.rendered, &app.content_view, &app.theme)
        .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(content, content_area);

    let search_status = app.search.status_line();
    let status_bar = StatusBarWidget::new(&app.header_path, &app.theme)
        .status(app.status.as_ref())
        .search_status(&search_status)
        .prompt(app.search_input.as_deref());
    frame.render_widget(status_bar, status_area);

    if app.show_help {
        frame.render_widget(HelpOverlay::new(&app.theme), area);
    }
}
