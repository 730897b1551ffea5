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

//! A bridge to forward logs from the `log` crate to the process-wide channels.
//!
//! The record target selects the channel, so `log::info!(target: "app", ...)` writes to the `app`
//! channel. Targets without a channel fall back to `stdout`.

use crate::get_logger;
use crate::record::Level;
use crate::record::Record;

struct LogCrateLogger(());

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        get_logger(metadata.target()).enabled(level_from_log(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let logger = get_logger(record.target());
        let level = level_from_log(record.level());
        if !logger.enabled(level) {
            return;
        }

        let record = Record::builder()
            .level(level)
            .channel(logger.name())
            .file(record.file())
            .line(record.line())
            .args(*record.args())
            .build();
        logger.log_record(&record);
    }

    fn flush(&self) {
        get_logger("stdout").flush();
        get_logger("stderr").flush();
    }
}

fn level_from_log(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] to set up a `LogCrateProxy` and all logs from log crate
/// will be forwarded to the channel named by their target.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// if let Err(err) = logforth_channel::bridge::try_setup_log_crate() {
///     eprintln!("failed to setup log crate: {err}");
/// }
/// ```
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] to set up a `LogCrateProxy` and all logs from log crate
/// will be forwarded to the channel named by their target.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// logforth_channel::bridge::setup_log_crate();
/// log::info!(target: "app", "hello");
/// ```
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "logforth_channel::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
