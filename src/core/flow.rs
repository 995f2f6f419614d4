//! # Declarative Flows
//!
//! A flow file describes a page tree in TOML. Loading it yields a [`Flow`]:
//! a root [`Navigator`] whose pages are [`FlowPage`] coordinators, with
//! nested navigators wherever an entry says `kind = "navigator"`.
//!
//! ```toml
//! title = "Onboarding"
//!
//! [[pages]]
//! title = "Welcome"
//! body = "Press → to continue."
//!
//! [[pages]]
//! title = "Profile"
//! kind = "navigator"
//!
//!   [[pages.pages]]
//!   title = "Name"
//!   prompt = "name"
//!
//! [[pages]]
//! title = "Summary"
//! show = ["name"]
//! ```
//!
//! Pages are instantiated lazily, one index at a time, by the caching page
//! manager of the navigator that owns them.
//!
//! ## What pages do with State
//!
//! - Every page bumps an int under `visits.<title>` when it is left.
//! - A prompt page also stores its input under the prompt key. Both writes
//!   go through one [`Transaction`](crate::core::state::Transaction).
//! - A page with `show = [...]` reads those keys on entry. Missing keys are
//!   reported as absent.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use log::{debug, info};
use serde::Deserialize;

use crate::core::config::ConfigError;
use crate::core::coordinator::{Coordinator, CoordinatorCore, LayoutDescriptor};
use crate::core::error::NavigationError;
use crate::core::navigator::Navigator;
use crate::core::page_manager::CachingPageManager;
use crate::core::state::State;
use crate::core::surface::{Container, RenderFactory, Surface};

/// Layout of a leaf flow page.
pub const PAGE_LAYOUT: LayoutDescriptor = LayoutDescriptor::from_static("flow_page");
/// Layout of a nested navigator; renders a container in its nested slot.
pub const NAVIGATOR_LAYOUT: LayoutDescriptor = LayoutDescriptor::from_static("flow_navigator");

/// Flow shown when no flow file is configured.
pub const DEMO_FLOW: &str = r#"
title = "Navigators demo"

[[pages]]
title = "Welcome"
body = """
Each page is a coordinator rendered into the navigator's container.
Press → or Enter for the next page, ← for the previous one, Esc to go back."""

[[pages]]
title = "Profile"
kind = "navigator"

  [[pages.pages]]
  title = "Name"
  body = "This page lives in a nested navigator. Type your name."
  prompt = "name"

  [[pages.pages]]
  title = "Team"
  body = "Still nested. Going past this page bubbles up to the root."
  prompt = "team"

[[pages]]
title = "Summary"
body = "Values carried forward through State:"
show = ["name", "team", "visits.Name"]
"#;

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowDefinition {
    pub title: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Page,
    Navigator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageDefinition {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub kind: PageKind,
    /// State key a text input is stored under.
    pub prompt: Option<String>,
    /// State keys displayed on entry.
    #[serde(default)]
    pub show: Vec<String>,
    /// Children of a `kind = "navigator"` entry.
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
}

/// Parse and check a flow definition.
pub fn parse_flow(source: &str) -> Result<FlowDefinition, ConfigError> {
    let definition: FlowDefinition = toml::from_str(source)?;
    validate(&definition.pages)?;
    Ok(definition)
}

pub fn load_flow(path: &Path) -> Result<FlowDefinition, ConfigError> {
    let source = fs::read_to_string(path)?;
    let definition = parse_flow(&source)?;
    info!("Loaded flow from {}", path.display());
    Ok(definition)
}

fn validate(pages: &[PageDefinition]) -> Result<(), ConfigError> {
    for page in pages {
        match page.kind {
            PageKind::Page if !page.pages.is_empty() => {
                return Err(ConfigError::Flow(format!(
                    "page `{}` has nested pages but is not kind = \"navigator\"",
                    page.title
                )));
            }
            PageKind::Navigator if page.prompt.is_some() || !page.show.is_empty() => {
                return Err(ConfigError::Flow(format!(
                    "navigator `{}` cannot take a prompt or show keys",
                    page.title
                )));
            }
            _ => {}
        }
        if page.prompt.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Flow(format!(
                "page `{}` has an empty prompt key",
                page.title
            )));
        }
        validate(&page.pages)?;
    }
    Ok(())
}

// ============================================================================
// Flow pages
// ============================================================================

/// The leaf page most recently entered, shared by every page of one flow.
type ActiveSlot = Rc<RefCell<Option<Weak<FlowPage>>>>;

/// A page declared in a flow file.
pub struct FlowPage {
    me: Weak<FlowPage>,
    core: CoordinatorCore,
    title: String,
    body: String,
    prompt: Option<String>,
    show: Vec<String>,
    input: RefCell<String>,
    active: ActiveSlot,
}

impl FlowPage {
    fn new(definition: &PageDefinition, active: ActiveSlot) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            core: CoordinatorCore::new(),
            title: definition.title.clone(),
            body: definition.body.clone(),
            prompt: definition.prompt.clone(),
            show: definition.show.clone(),
            input: RefCell::new(String::new()),
            active,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// State key this page's input is stored under, if it takes input.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn input(&self) -> String {
        self.input.borrow().clone()
    }

    pub fn push_char(&self, c: char) {
        if self.prompt.is_some() {
            self.input.borrow_mut().push(c);
        }
    }

    pub fn pop_char(&self) -> bool {
        self.prompt.is_some() && self.input.borrow_mut().pop().is_some()
    }

    /// The `show` keys with their values in the state this page received.
    pub fn shown_values(&self) -> Vec<(String, Option<String>)> {
        let state = self.state();
        self.show
            .iter()
            .map(|key| {
                let value = state
                    .get_string(key)
                    .map(str::to_string)
                    .or_else(|_| state.get_int(key).map(|n| n.to_string()))
                    .ok();
                (key.clone(), value)
            })
            .collect()
    }

    fn visits_key(&self) -> String {
        format!("visits.{}", self.title)
    }

    fn activate(&self) {
        *self.active.borrow_mut() = Some(self.me.clone());
    }
}

impl Coordinator for FlowPage {
    fn core(&self) -> &CoordinatorCore {
        &self.core
    }

    fn layout(&self) -> LayoutDescriptor {
        PAGE_LAYOUT
    }

    fn name(&self) -> String {
        self.title.clone()
    }

    fn on_enter(&self, _surface: &dyn Surface) {
        // A prompt seen on an earlier pass starts from what was entered then.
        if let Some(key) = &self.prompt
            && self.input.borrow().is_empty()
            && let Ok(previous) = self.state().get_string(key)
        {
            *self.input.borrow_mut() = previous.to_string();
        }
        self.activate();
    }

    fn on_reenter(&self, _surface: &dyn Surface) {
        self.activate();
    }

    fn detach(&self, _surface: &dyn Surface) {
        let mut active = self.active.borrow_mut();
        if active
            .as_ref()
            .is_some_and(|page| Weak::ptr_eq(page, &self.me))
        {
            *active = None;
        }
    }

    fn ending_state(&self, state: State) -> State {
        let visits = state.get_int(&self.visits_key()).unwrap_or(0) + 1;
        match &self.prompt {
            Some(key) => {
                let mut tx = state.start_transaction();
                tx.put_string(key.clone(), self.input())
                    .put_int(self.visits_key(), visits);
                tx.commit()
            }
            None => state.put_int(self.visits_key(), visits),
        }
    }
}

// ============================================================================
// Flow trees
// ============================================================================

/// A loaded flow: its root navigator plus a view of the active page.
pub struct Flow {
    title: String,
    root: Rc<Navigator>,
    active: ActiveSlot,
}

impl Flow {
    pub fn build(definition: &FlowDefinition, render_factory: Rc<dyn RenderFactory>) -> Self {
        let title = definition
            .title
            .clone()
            .unwrap_or_else(|| "Untitled flow".to_string());
        let active: ActiveSlot = Rc::new(RefCell::new(None));
        let root = navigator_for(
            &title,
            definition.pages.clone(),
            &render_factory,
            &active,
        );
        debug!(
            "Built flow `{}` with {} top-level pages",
            title,
            definition.pages.len()
        );
        Self {
            title,
            root,
            active,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> &Rc<Navigator> {
        &self.root
    }

    pub fn initialize(&self, container: Rc<dyn Container>) -> Result<(), NavigationError> {
        self.root.initialize(container)
    }

    /// The leaf page currently on screen.
    pub fn active_page(&self) -> Option<Rc<FlowPage>> {
        self.active.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Names of the navigators from the root down to the active page.
    pub fn breadcrumbs(&self) -> Vec<String> {
        let mut trail = vec![self.title.clone()];
        let mut navigator = Rc::clone(&self.root);
        while let Some(child) = navigator
            .current_coordinator()
            .and_then(|current| current.as_navigator())
        {
            trail.push(child.name());
            navigator = child;
        }
        trail
    }
}

fn navigator_for(
    name: &str,
    pages: Vec<PageDefinition>,
    render_factory: &Rc<dyn RenderFactory>,
    active: &ActiveSlot,
) -> Rc<Navigator> {
    let factory = Rc::clone(render_factory);
    let slot = Rc::clone(active);
    let page_manager = CachingPageManager::new(move |index: usize| {
        let definition = pages.get(index)?;
        let page: Rc<dyn Coordinator> = match definition.kind {
            PageKind::Page => FlowPage::new(definition, Rc::clone(&slot)),
            PageKind::Navigator => navigator_for(
                &definition.title,
                definition.pages.clone(),
                &factory,
                &slot,
            ),
        };
        Some(page)
    });
    Navigator::builder(page_manager, Rc::clone(render_factory))
        .with_name(name)
        .with_layout(NAVIGATOR_LAYOUT)
        .build()
}
