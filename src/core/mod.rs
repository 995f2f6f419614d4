//! # Navigation Engine
//!
//! Everything that decides *which* page is shown and *what* it is handed.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │            CORE              │
//!                    │  (this module)               │
//!                    │                              │
//!                    │  • Navigator (traversal)     │
//!                    │  • PageManager (cursor)      │
//!                    │  • Coordinator (page hooks)  │
//!                    │  • State (context)           │
//!                    │                              │
//!                    │  No drawing. No terminal.    │
//!                    └──────────────┬───────────────┘
//!                                   │ Surface / Container / RenderFactory
//!                    ┌──────────────┴───────────────┐
//!                    ▼                              ▼
//!             ┌────────────┐                 ┌────────────┐
//!             │    TUI     │                 │  In-memory │
//!             │  Adapter   │                 │  (tests)   │
//!             │ (ratatui)  │                 │            │
//!             └────────────┘                 └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`navigator`]: `Navigator`, the depth-first traversal and its callback
//! - [`page_manager`]: `PageManager` and the lazy `CachingPageManager`
//! - [`coordinator`]: the `Coordinator` hook set every page implements
//! - [`binding`]: `AttachmentBinding`, exactly-once attach/detach
//! - [`surface`]: the interfaces a rendering host implements
//! - [`state`]: immutable `State` and its `Transaction`
//! - [`flow`]: page trees declared in TOML
//! - [`config`]: settings and their override hierarchy

pub mod binding;
pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod navigator;
pub mod page_manager;
pub mod state;
pub mod surface;

pub use coordinator::{Coordinator, CoordinatorCore, LayoutDescriptor};
pub use error::NavigationError;
pub use navigator::{Direction, NavigationCallback, Navigator};
pub use page_manager::{CachingPageManager, PageFactory, PageManager};
pub use state::{State, StateError, Transaction};
pub use surface::{Container, NAVIGATOR_CONTENT, RenderFactory, Surface};
