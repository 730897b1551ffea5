// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::sync::Arc;

use crate::Append;
use crate::Trap;
use crate::append::Stdout;
use crate::record::Level;
use crate::record::Record;
use crate::router::LevelRouter;
use crate::trap::DefaultTrap;

/// A handle to a named channel.
///
/// Cloning is cheap and the handle can be shared between threads. Emitting never fails: records
/// below the threshold are dropped, and write errors are handed to the channel's [`Trap`].
///
/// `Fatal` and `Panic` are severities only. Emitting at them neither exits nor panics.
///
/// # Examples
///
/// ```
/// use logforth_channel::Logger;
/// use logforth_channel::record::Level;
///
/// let logger = Logger::default();
/// assert_eq!(logger.level(), Level::Info);
/// logger.info(format_args!("hello {}", "world"));
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    name: String,
    level: Level,
    sink: Arc<dyn Append>,
    router: Arc<LevelRouter>,
    trap: Arc<dyn Trap>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("level", &self.inner.level)
            .field("sink", &self.inner.sink)
            .finish_non_exhaustive()
    }
}

/// A handle writing to the standard output at [`Level::Info`] without routing.
impl Default for Logger {
    fn default() -> Self {
        Logger::new(
            "default",
            Level::Info,
            Arc::new(Stdout::default()),
            Arc::new(LevelRouter::new()),
            Arc::new(DefaultTrap::default()),
        )
    }
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<String>,
        level: Level,
        sink: Arc<dyn Append>,
        router: Arc<LevelRouter>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        let inner = LoggerInner {
            name: name.into(),
            level,
            sink,
            router,
            trap,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The channel name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The least severe level this channel accepts.
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// Return whether a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        self.inner.level.allows(level)
    }

    /// Emit a message at `level`.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let record = Record::builder()
            .level(level)
            .channel(self.name())
            .args(args)
            .build();
        self.write(&record);
    }

    /// Emit a prepared record.
    ///
    /// The record is subject to this channel's threshold like any other.
    pub fn log_record(&self, record: &Record) {
        if self.enabled(record.level()) {
            self.write(record);
        }
    }

    fn write(&self, record: &Record) {
        let inner = &self.inner;
        if let Err(err) = inner.sink.append(record) {
            inner.trap.trap(&err.with_context("channel", &inner.name));
        }
        for err in inner.router.route(record, Some(&inner.sink)) {
            inner.trap.trap(&err.with_context("channel", &inner.name));
        }
    }

    /// Emit a message at [`Level::Debug`].
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    /// Emit a message at [`Level::Info`].
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    /// Emit a message at [`Level::Warn`].
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    /// Emit a message at [`Level::Error`].
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }

    /// Emit a message at [`Level::Fatal`].
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args)
    }

    /// Emit a message at [`Level::Panic`].
    pub fn panic(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Panic, args)
    }

    /// Flush the channel sink and the routed sinks.
    pub fn flush(&self) {
        let inner = &self.inner;
        if let Err(err) = inner.sink.flush() {
            inner.trap.trap(&err.with_context("channel", &inner.name));
        }
        for err in inner.router.flush() {
            inner.trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;
    use crate::ErrorKind;

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Append for Collect {
        fn append(&self, record: &Record) -> Result<(), Error> {
            let line = format!(
                "{} {} {}",
                record.channel(),
                record.level(),
                record.payload()
            );
            self.0.lock().unwrap().push(line);
            Ok(())
        }
    }

    impl Collect {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Debug, Default)]
    struct CountTrap(Mutex<Vec<String>>);

    impl Trap for CountTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn test_threshold() {
        let sink = Arc::new(Collect::default());
        let logger = Logger::new(
            "app",
            Level::Warn,
            sink.clone(),
            Arc::new(LevelRouter::new()),
            Arc::new(DefaultTrap::default()),
        );

        logger.debug(format_args!("dropped"));
        logger.info(format_args!("dropped"));
        logger.warn(format_args!("kept {}", 1));
        logger.error(format_args!("kept {}", 2));
        logger.fatal(format_args!("kept {}", 3));
        logger.panic(format_args!("kept {}", 4));

        assert_eq!(
            sink.lines(),
            vec![
                "app WARN kept 1",
                "app ERROR kept 2",
                "app FATAL kept 3",
                "app PANIC kept 4",
            ]
        );
    }

    #[test]
    fn test_routing_after_threshold() {
        let sink = Arc::new(Collect::default());
        let stderr = Arc::new(Collect::default());
        let stdout = Arc::new(Collect::default());
        let router = Arc::new(LevelRouter::standard(stderr.clone(), stdout.clone()));
        let logger = Logger::new(
            "app",
            Level::Info,
            sink.clone(),
            router,
            Arc::new(DefaultTrap::default()),
        );

        logger.debug(format_args!("below threshold"));
        logger.info(format_args!("started"));
        logger.error(format_args!("failed"));

        assert_eq!(sink.lines(), vec!["app INFO started", "app ERROR failed"]);
        assert_eq!(stdout.lines(), vec!["app INFO started"]);
        assert_eq!(stderr.lines(), vec!["app ERROR failed"]);
    }

    #[test]
    fn test_own_sink_written_once() {
        let stderr = Arc::new(Collect::default());
        let stdout = Arc::new(Collect::default());
        let stderr_dyn: Arc<dyn Append> = stderr.clone();
        let router = Arc::new(LevelRouter::standard(stderr_dyn.clone(), stdout.clone()));
        let logger = Logger::new(
            "stderr",
            Level::Error,
            stderr_dyn,
            router,
            Arc::new(DefaultTrap::default()),
        );

        logger.error(format_args!("boom"));
        assert_eq!(stderr.lines(), vec!["stderr ERROR boom"]);
        assert!(stdout.lines().is_empty());
    }

    #[test]
    fn test_write_errors_are_trapped() {
        #[derive(Debug)]
        struct Broken;

        impl Append for Broken {
            fn append(&self, _: &Record) -> Result<(), Error> {
                Err(Error::new(ErrorKind::Unexpected, "disk full"))
            }
        }

        let trap = Arc::new(CountTrap::default());
        let logger = Logger::new(
            "app",
            Level::Debug,
            Arc::new(Broken),
            Arc::new(LevelRouter::new()),
            trap.clone(),
        );

        logger.info(format_args!("lost"));
        let trapped = trap.0.lock().unwrap().clone();
        assert_eq!(trapped.len(), 1);
        assert!(trapped[0].contains("disk full"), "{trapped:?}");
        assert!(trapped[0].contains("channel: app"), "{trapped:?}");
    }

    #[test]
    fn test_default_handle() {
        let logger = Logger::default();
        assert_eq!(logger.name(), "default");
        assert_eq!(logger.level(), Level::Info);
        assert!(logger.enabled(Level::Warn));
        assert!(!logger.enabled(Level::Debug));
    }
}
