//! # PageView Component
//!
//! Draws the active flow page inside one frame per enclosing nested
//! navigator:
//!
//! ```text
//! ┌Profile──────────────────────┐
//! │┌Name───────────────────────┐│
//! ││This page lives in a ...   ││
//! ││                           ││
//! ││name: Ada█                 ││
//! │└───────────────────────────┘│
//! └─────────────────────────────┘
//! ```

use crate::core::flow::FlowPage;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

pub struct PageView {
    /// Names of the nested navigators around the page, outermost first
    pub frames: Vec<String>,
    pub title: String,
    pub body: String,
    /// Prompt key and what has been typed so far
    pub prompt: Option<(String, String)>,
    pub shown: Vec<(String, Option<String>)>,
}

impl PageView {
    pub fn from_page(page: &FlowPage, frames: Vec<String>) -> Self {
        Self {
            frames,
            title: page.title().to_string(),
            body: page.body().to_string(),
            prompt: page.prompt().map(|key| (key.to_string(), page.input())),
            shown: page.shown_values(),
        }
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = textwrap::wrap(&self.body, usize::from(width.max(1)))
            .into_iter()
            .map(|l| Line::raw(l.into_owned()))
            .collect();

        if let Some((key, input)) = &self.prompt {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled(format!("{key}: "), Style::default().fg(Color::Cyan)),
                Span::raw(input.clone()),
                Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]));
        }

        if !self.shown.is_empty() {
            lines.push(Line::raw(""));
            for (key, value) in &self.shown {
                let value = match value {
                    Some(v) => Span::raw(v.clone()),
                    None => Span::styled(
                        "(not set)",
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{key}: "), Style::default().fg(Color::Cyan)),
                    value,
                ]));
            }
        }
        lines
    }
}

impl Component for PageView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut area = area;
        for name in &self.frames {
            let block = Block::bordered()
                .title(name.as_str())
                .border_style(Style::default().add_modifier(Modifier::DIM));
            let inner = block.inner(area);
            frame.render_widget(block, area);
            area = inner;
        }

        let block = Block::bordered().title(Span::styled(
            self.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        let inner = block.inner(area);
        let lines = self.lines(inner.width);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
