//! # StatePanel Component
//!
//! Side panel listing the State the active page received, one `key = value`
//! per line. Shown when `[display] show_state = true`.

use crate::core::state::{State, Value};
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

pub struct StatePanel {
    pub entries: Vec<(String, String)>,
}

impl StatePanel {
    pub fn from_state(state: &State) -> Self {
        let entries = state
            .keys()
            .filter_map(|key| {
                let shown = match state.get(key)? {
                    Value::Str(s) => format!("{s:?}"),
                    Value::Int(i) => i.to_string(),
                    Value::Object(_) => "<object>".to_string(),
                };
                Some((key.to_string(), shown))
            })
            .collect();
        Self { entries }
    }
}

impl Component for StatePanel {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.entries.is_empty() {
            vec![Line::styled(
                "(empty)",
                Style::default().add_modifier(Modifier::DIM),
            )]
        } else {
            self.entries
                .iter()
                .map(|(key, value)| Line::raw(format!("{key} = {value}")))
                .collect()
        };
        let panel = Paragraph::new(lines).block(Block::bordered().title("State"));
        frame.render_widget(panel, area);
    }
}
