use crate::core::coordinator::Coordinator;
use crate::core::flow::Flow;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{PageView, StatePanel, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Paragraph};

const STATE_PANEL_WIDTH: u16 = 34;

pub fn draw_ui(frame: &mut Frame, flow: &Flow, tui: &TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, main_area, hint_area] = layout.areas(frame.area());

    let breadcrumbs = flow.breadcrumbs();
    TitleBar::new(
        breadcrumbs.clone(),
        tui.show_breadcrumbs,
        tui.status_message(),
    )
    .render(frame, title_area);

    let Some(page) = flow.active_page() else {
        draw_empty_view(frame, main_area);
        return;
    };

    let page_area = if tui.show_state {
        let [page_area, state_area] =
            Layout::horizontal([Min(0), Length(STATE_PANEL_WIDTH)]).areas(main_area);
        StatePanel::from_state(&page.state()).render(frame, state_area);
        page_area
    } else {
        main_area
    };

    // The first breadcrumb is the flow itself, the rest are nested navigators.
    let frames = breadcrumbs.into_iter().skip(1).collect();
    PageView::from_page(&page, frames).render(frame, page_area);

    let hints = if page.prompt().is_some() {
        "type to answer · → next · ← previous · Esc back · Ctrl+C quit"
    } else {
        "→/n next · ←/p previous · Esc back · q quit"
    };
    frame.render_widget(
        Span::styled(hints, Style::default().add_modifier(Modifier::DIM)),
        hint_area,
    );
}

fn draw_empty_view(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("Nothing to show")
        .block(Block::bordered())
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
