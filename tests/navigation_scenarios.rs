//! End-to-end navigation scenarios against the public API, rendered on the
//! terminal surfaces the binary uses.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use navigators::core::binding::AttachmentBinding;
use navigators::core::flow::{Flow, load_flow};
use navigators::core::surface::AttachStateListener;
use navigators::core::{
    CachingPageManager, Container, Coordinator, CoordinatorCore, Direction, LayoutDescriptor,
    NavigationError, Navigator, PageFactory, State, Surface,
};
use navigators::tui::event::TuiEvent;
use navigators::tui::surface::{TerminalContainer, TerminalRenderFactory};
use navigators::tui::{Control, TuiState, handle_event};

const PAGE: &str = "page";
const NESTED: &str = "nested";

type Journal = Rc<RefCell<Vec<String>>>;

struct Page {
    core: CoordinatorCore,
    name: String,
    journal: Journal,
    ending: Option<(&'static str, i64)>,
}

impl Page {
    fn new(name: &str, journal: &Journal) -> Rc<Self> {
        Rc::new(Self {
            core: CoordinatorCore::new(),
            name: name.to_string(),
            journal: Rc::clone(journal),
            ending: None,
        })
    }

    fn writing(name: &str, journal: &Journal, key: &'static str, value: i64) -> Rc<Self> {
        Rc::new(Self {
            core: CoordinatorCore::new(),
            name: name.to_string(),
            journal: Rc::clone(journal),
            ending: Some((key, value)),
        })
    }

    fn note(&self, hook: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{}", self.name, hook));
    }
}

impl Coordinator for Page {
    fn core(&self) -> &CoordinatorCore {
        &self.core
    }

    fn layout(&self) -> LayoutDescriptor {
        LayoutDescriptor::from_static(PAGE)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn attach(&self, _surface: &dyn Surface) {
        self.note("attach");
    }

    fn on_enter(&self, _surface: &dyn Surface) {
        self.note("enter");
    }

    fn on_reenter(&self, _surface: &dyn Surface) {
        self.note("reenter");
    }

    fn on_exit_forwards(&self, _surface: &dyn Surface) {
        self.note("exit_forwards");
    }

    fn on_exit_backwards(&self, _surface: &dyn Surface) {
        self.note("exit_backwards");
    }

    fn detach(&self, _surface: &dyn Surface) {
        self.note("detach");
    }

    fn ending_state(&self, state: State) -> State {
        match self.ending {
            Some((key, value)) => state.put_int(key, value),
            None => state,
        }
    }
}

fn factory() -> Rc<TerminalRenderFactory> {
    Rc::new(TerminalRenderFactory::with_layouts(&[PAGE], &[NESTED]))
}

fn pages_of(pages: Vec<Rc<dyn Coordinator>>) -> CachingPageManager<impl PageFactory + use<>> {
    CachingPageManager::new(move |index: usize| pages.get(index).cloned())
}

#[test]
fn test_two_page_walkthrough() {
    let journal = Journal::default();
    let p0 = Page::writing("p0", &journal, "seen_p0", 1);
    let p1 = Page::new("p1", &journal);
    let outcomes: Rc<RefCell<Vec<(bool, bool)>>> = Rc::default();
    let recorded = Rc::clone(&outcomes);

    let root = Navigator::builder(
        pages_of(vec![p0.clone() as Rc<dyn Coordinator>, p1.clone()]),
        factory(),
    )
    .build();
    root.set_navigation_callback(Rc::new(move |direction: Direction, handled: bool| {
        recorded
            .borrow_mut()
            .push((direction == Direction::Forward, handled));
    }));
    let container = TerminalContainer::new();
    root.initialize(container.clone()).unwrap();

    assert!(p0.is_attached());
    assert!(p0.state().is_empty());
    assert!(!container.is_empty());

    assert!(root.next_page().unwrap());
    assert!(!p0.is_attached());
    assert!(p1.is_attached());
    assert_eq!(p1.state().get_int("seen_p0").unwrap(), 1);
    assert_eq!(
        journal.borrow().as_slice(),
        [
            "p0:attach",
            "p0:enter",
            "p0:exit_forwards",
            "p0:detach",
            "p1:attach",
            "p1:enter",
        ]
    );

    assert!(!root.next_page().unwrap());
    assert!(p1.is_attached());
    assert_eq!(
        container.child().map(|c| c.id()),
        root.current_surface().map(|s| s.id())
    );
    assert_eq!(
        outcomes.borrow().as_slice(),
        [(true, true), (true, true), (true, false)]
    );
}

#[test]
fn test_previous_on_first_page_changes_nothing() {
    let journal = Journal::default();
    let root = Navigator::builder(
        pages_of(vec![
            Page::new("p0", &journal) as Rc<dyn Coordinator>,
            Page::new("p1", &journal),
        ]),
        factory(),
    )
    .build();
    let container = TerminalContainer::new();
    root.initialize(container.clone()).unwrap();
    let shown = container.child().map(|c| c.id());
    let before = journal.borrow().len();

    assert!(!root.previous_page().unwrap());
    assert_eq!(container.child().map(|c| c.id()), shown);
    assert_eq!(journal.borrow().len(), before);
    assert!(root.state().is_empty());
}

#[test]
fn test_depth_first_then_bubble() {
    let journal = Journal::default();
    let render = factory();
    let inner = Navigator::builder(
        pages_of(vec![
            Page::new("b0", &journal) as Rc<dyn Coordinator>,
            Page::new("b1", &journal),
        ]),
        render.clone(),
    )
    .with_name("B")
    .with_layout(LayoutDescriptor::from_static(NESTED))
    .build();
    let after = Page::new("a1", &journal);
    let root = Navigator::builder(
        pages_of(vec![inner.clone() as Rc<dyn Coordinator>, after.clone()]),
        render,
    )
    .with_name("A")
    .build();
    root.initialize(TerminalContainer::new()).unwrap();

    assert!(root.next_page().unwrap());
    assert_eq!(inner.current_coordinator().unwrap().name(), "b1");
    assert_eq!(root.current_coordinator().unwrap().name(), "B");

    assert!(root.next_page().unwrap());
    assert!(after.is_attached());
    assert!(!inner.is_attached());

    // Every page that was attached has been detached exactly once so far.
    let log = journal.borrow();
    for name in ["b0", "b1"] {
        let attaches = log.iter().filter(|e| **e == format!("{name}:attach")).count();
        let detaches = log.iter().filter(|e| **e == format!("{name}:detach")).count();
        assert_eq!(attaches, detaches, "{name}");
    }
}

#[test]
fn test_nested_navigator_needs_nested_layout() {
    let journal = Journal::default();
    let render = factory();
    let inner = Navigator::builder(
        pages_of(vec![Page::new("b0", &journal) as Rc<dyn Coordinator>]),
        render.clone(),
    )
    .with_name("B")
    .with_layout(LayoutDescriptor::from_static(PAGE))
    .build();
    let root = Navigator::builder(pages_of(vec![inner as Rc<dyn Coordinator>]), render)
        .with_name("A")
        .build();

    let err = root.initialize(TerminalContainer::new()).unwrap_err();
    assert!(matches!(err, NavigationError::MissingNestedContainer { .. }));
    assert!(err.to_string().contains("navigator_content"));
}

#[test]
fn test_repeated_attach_signal_is_idempotent() {
    let journal = Journal::default();
    let page = Page::new("p", &journal);
    let surface: Rc<dyn Surface> = TerminalContainer::new();

    let binding = AttachmentBinding::bind(&surface, page.clone(), None).unwrap();
    binding.on_attached(&surface).unwrap();
    binding.on_attached(&surface).unwrap();

    assert!(page.is_attached());
    assert_eq!(journal.borrow().as_slice(), ["p:attach"]);

    let elsewhere: Rc<dyn Surface> = TerminalContainer::new();
    let second = AttachmentBinding::new(page.clone(), None);
    assert!(matches!(
        second.on_attached(&elsewhere),
        Err(NavigationError::AlreadyAttached { .. })
    ));
}

#[test]
fn test_flow_file_through_key_events() {
    let dir = std::env::temp_dir().join(format!("navigators-flow-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("signup.toml");
    fs::write(
        &path,
        r#"
title = "Signup"

[[pages]]
title = "Hello"

[[pages]]
title = "Account"
kind = "navigator"

  [[pages.pages]]
  title = "Email"
  prompt = "email"

[[pages]]
title = "Done"
show = ["email", "visits.Hello"]
"#,
    )
    .unwrap();

    let definition = load_flow(&path).unwrap();
    let flow = Flow::build(&definition, TerminalRenderFactory::new());
    let tui = TuiState::new(true, true, false);
    flow.root().set_navigation_callback(tui.status_callback());
    flow.initialize(TerminalContainer::new()).unwrap();

    let keys = [
        TuiEvent::Next,
        TuiEvent::InputChar('a'),
        TuiEvent::InputChar('@'),
        TuiEvent::InputChar('b'),
        TuiEvent::Next,
    ];
    for key in keys {
        assert_eq!(handle_event(&flow, &tui, key).unwrap(), Control::Continue);
    }

    let done = flow.active_page().unwrap();
    assert_eq!(done.title(), "Done");
    assert_eq!(
        done.shown_values(),
        vec![
            ("email".to_string(), Some("a@b".to_string())),
            ("visits.Hello".to_string(), Some("1".to_string())),
        ]
    );

    // Walk back into the nested navigator; it starts over at its first page.
    handle_event(&flow, &tui, TuiEvent::Previous).unwrap();
    assert_eq!(flow.breadcrumbs(), vec!["Signup", "Account"]);
    assert_eq!(flow.active_page().unwrap().title(), "Email");

    flow.root().release();
    assert!(flow.active_page().is_none());
    fs::remove_dir_all(&dir).unwrap();
}
