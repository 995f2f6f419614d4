//! # TitleBar Component
//!
//! Top status bar: flow title, where in the navigator tree the user is, and
//! the last navigation outcome.
//!
//! ## Conditional Formatting
//!
//! 1. **Breadcrumbs and status**: `"Onboarding › Profile | Reached the last page"`
//! 2. **Status only**: `"Onboarding | Reached the last page"`
//! 3. **Default**: `"Onboarding"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

const SEPARATOR: &str = " › ";

/// Top status bar component.
pub struct TitleBar {
    /// Navigator path from the root; the first entry is the flow title
    pub breadcrumbs: Vec<String>,
    /// Whether to show the full path or only the flow title
    pub show_breadcrumbs: bool,
    /// Last navigation outcome, empty when the last move succeeded
    pub status_message: String,
}

impl TitleBar {
    pub fn new(breadcrumbs: Vec<String>, show_breadcrumbs: bool, status_message: String) -> Self {
        Self {
            breadcrumbs,
            show_breadcrumbs,
            status_message,
        }
    }

    fn heading(&self) -> String {
        if self.show_breadcrumbs {
            self.breadcrumbs.join(SEPARATOR)
        } else {
            self.breadcrumbs.first().cloned().unwrap_or_default()
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            self.heading(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message.clone(),
                Style::default().add_modifier(Modifier::ITALIC),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
