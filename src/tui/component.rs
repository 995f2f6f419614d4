use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive data via props (struct fields) and render to a
/// `Frame` within a given `Rect`. They never reach into the navigator tree
/// themselves; `ui.rs` reads the flow and hands them what they show.
///
/// The `render` method takes `&mut self` so a component may cache layout
/// work (e.g. wrapped lines) between the measure and draw steps.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
