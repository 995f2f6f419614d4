//! # TUI Components
//!
//! Stateless, props-based display components. Each receives everything it
//! shows as struct fields, so it can be built in a test without a flow:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(flow.breadcrumbs(), true, status);
//! title_bar.render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (flow title, breadcrumbs, navigation status)
//! ├── page_view.rs     (the active page inside its navigator frames)
//! └── state_panel.rs   (State the active page received)
//! ```

mod page_view;
mod state_panel;
mod title_bar;

pub use page_view::PageView;
pub use state_panel::StatePanel;
pub use title_bar::TitleBar;
