use crate::error::StampbakError;
use crate::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;

/// Sink for the events a backup run emits
pub trait Logger {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }
}

/// Forwards events to whatever `tracing` subscriber is installed
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

/// Install a global subscriber that appends plain-text events to `log_path`
pub fn init_file_logging(level: LevelFilter, log_path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| StampbakError::io_at(log_path, e))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| StampbakError::config(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Logger;
    use std::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Error,
        Debug,
    }

    /// Keeps every event in memory so tests can assert on order
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        events: RefCell<Vec<(Level, String)>>,
    }

    impl RecordingLogger {
        pub fn events(&self) -> Vec<(Level, String)> {
            self.events.borrow().clone()
        }

        pub fn messages(&self, level: Level) -> Vec<String> {
            self.events
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Logger for RecordingLogger {
        fn info(&self, message: &str) {
            self.events.borrow_mut().push((Level::Info, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.events
                .borrow_mut()
                .push((Level::Error, message.to_string()));
        }

        fn debug(&self, message: &str) {
            self.events
                .borrow_mut()
                .push((Level::Debug, message.to_string()));
        }
    }
}
