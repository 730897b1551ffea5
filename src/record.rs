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

//! Log record and severity levels.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use crate::Error;
use crate::ErrorKind;

/// The payload of a log message, as emitted through a channel.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    // the observed time
    now: SystemTime,

    level: Level,
    channel: &'a str,
    file: Option<&'a str>,
    line: Option<u32>,

    payload: Cow<'a, str>,
}

impl<'a> Record<'a> {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// The severity of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the channel that emitted the message.
    pub fn channel(&self) -> &'a str {
        self.channel
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                level: Level::Info,
                channel: "",
                file: None,
                line: None,
                payload: Cow::Borrowed(""),
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`channel`](Record::channel).
    pub fn channel(mut self, channel: &'a str) -> Self {
        self.record.channel = channel;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<Cow<'a, str>>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Set [`payload`](Record::payload) from format arguments.
    ///
    /// Static messages are borrowed; anything else is rendered once here.
    pub fn args(mut self, args: fmt::Arguments<'_>) -> Self {
        self.record.payload = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record<'a> {
        self.record
    }
}

/// An enum representing the available severity levels of a channel.
///
/// Levels are ordered from the most severe to the most verbose, so
/// `Level::Panic < Level::Error < Level::Debug`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The most severe level.
    Panic,
    /// Designates errors the application cannot recover from.
    Fatal,
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
}

impl Level {
    /// All levels, from the most severe to the most verbose.
    pub const ALL: [Level; 6] = [
        Level::Panic,
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Return whether a record at `level` passes a threshold of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_channel::record::Level;
    ///
    /// assert!(Level::Info.allows(Level::Error));
    /// assert!(Level::Info.allows(Level::Info));
    /// assert!(!Level::Info.allows(Level::Debug));
    /// ```
    pub fn allows(&self, level: Level) -> bool {
        level <= *self
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("panic", Level::Panic),
            ("fatal", Level::Fatal),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("warning", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::new(
            ErrorKind::InvalidLevel,
            format!("malformed level: {s:?}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Fatal);
        assert_eq!("panic".parse::<Level>().unwrap(), Level::Panic);

        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLevel);
        assert_eq!("".parse::<Level>().unwrap_err().kind(), ErrorKind::InvalidLevel);
    }

    #[test]
    fn test_level_threshold() {
        assert!(Level::Error.allows(Level::Panic));
        assert!(Level::Error.allows(Level::Fatal));
        assert!(Level::Error.allows(Level::Error));
        assert!(!Level::Error.allows(Level::Warn));
        assert!(Level::Debug.allows(Level::Debug));
        assert!(!Level::Panic.allows(Level::Fatal));
    }

    #[test]
    fn test_record_args_borrow_static_message() {
        let record = Record::builder().args(format_args!("static")).build();
        assert!(matches!(record.payload, Cow::Borrowed("static")));

        let n = 42;
        let record = Record::builder()
            .channel("app")
            .level(Level::Warn)
            .args(format_args!("value={n}"))
            .build();
        assert_eq!(record.payload(), "value=42");
        assert_eq!(record.channel(), "app");
        assert_eq!(record.level(), Level::Warn);
    }
}
