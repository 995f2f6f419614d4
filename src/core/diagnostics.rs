//! Per-navigator diagnostic sink.
//!
//! Navigators log through a `Diagnostics` value instead of the `log` macros
//! so an application can route one navigator tree's records to its own
//! [`log::Log`] (a test recorder, a per-screen file). Without an injected
//! sink, records go to the process-wide logger and honour `log::max_level()`.

use std::fmt;

use log::{Level, Log, Record};

const TARGET: &str = "navigators::navigator";

#[derive(Default)]
pub struct Diagnostics {
    sink: Option<Box<dyn Log>>,
}

impl Diagnostics {
    pub fn new(sink: Option<Box<dyn Log>>) -> Self {
        Self { sink }
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let record = Record::builder()
            .level(level)
            .target(TARGET)
            .module_path_static(Some(module_path!()))
            .args(args)
            .build();
        match &self.sink {
            Some(sink) => {
                if sink.enabled(record.metadata()) {
                    sink.log(&record);
                }
            }
            None => {
                if level <= log::max_level() {
                    log::logger().log(&record);
                }
            }
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("injected", &self.sink.is_some())
            .finish()
    }
}
