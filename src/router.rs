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

//! Severity-based routing shared by all channels of a registry.

use std::sync::Arc;

use crate::Append;
use crate::Error;
use crate::record::Level;
use crate::record::Record;

/// Levels copied to the stderr sink by [`LevelRouter::standard`].
pub const STDERR_LEVELS: [Level; 3] = [Level::Panic, Level::Fatal, Level::Error];

/// Levels copied to the stdout sink by [`LevelRouter::standard`].
pub const STDOUT_LEVELS: [Level; 3] = [Level::Warn, Level::Info, Level::Debug];

#[derive(Debug)]
struct Hook {
    levels: Vec<Level>,
    append: Arc<dyn Append>,
}

/// Copies records to extra sinks by severity, whichever channel emitted them.
///
/// Routing is additive: the emitting channel still writes to its own sink. A hook is skipped when
/// its sink is the emitting channel's own sink, so a record is never written twice to one sink.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logforth_channel::Append;
/// use logforth_channel::append::Stdout;
/// use logforth_channel::router::LevelRouter;
///
/// let stderr: Arc<dyn Append> = Arc::new(Stdout::default());
/// let stdout: Arc<dyn Append> = Arc::new(Stdout::default());
/// let router = LevelRouter::standard(stderr, stdout);
/// ```
#[derive(Debug, Default)]
pub struct LevelRouter {
    hooks: Vec<Hook>,
}

impl LevelRouter {
    /// Create a router without hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route {Panic, Fatal, Error} records to `stderr` and {Warn, Info, Debug} records to
    /// `stdout`.
    pub fn standard(stderr: Arc<dyn Append>, stdout: Arc<dyn Append>) -> Self {
        Self::new()
            .hook(STDERR_LEVELS, stderr)
            .hook(STDOUT_LEVELS, stdout)
    }

    /// Add a hook writing records at any of `levels` to `append`.
    #[must_use]
    pub fn hook(mut self, levels: impl IntoIterator<Item = Level>, append: Arc<dyn Append>) -> Self {
        self.hooks.push(Hook {
            levels: levels.into_iter().collect(),
            append,
        });
        self
    }

    /// Write `record` to every hook sink that takes its level, except `origin`.
    ///
    /// All hooks are attempted; the errors of failing hooks are returned.
    pub fn route(&self, record: &Record, origin: Option<&Arc<dyn Append>>) -> Vec<Error> {
        let level = record.level();
        let mut errors = vec![];
        for hook in &self.hooks {
            if !hook.levels.contains(&level) {
                continue;
            }
            if origin.is_some_and(|origin| Arc::ptr_eq(origin, &hook.append)) {
                continue;
            }
            if let Err(err) = hook.append.append(record) {
                errors.push(err);
            }
        }
        errors
    }

    /// Flush every hook sink.
    pub fn flush(&self) -> Vec<Error> {
        self.hooks
            .iter()
            .filter_map(|hook| hook.append.flush().err())
            .collect()
    }
}
