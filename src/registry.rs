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

//! The set of named channels built from a configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

use crate::Append;
use crate::Error;
use crate::Logger;
use crate::Trap;
use crate::append::Stdout;
use crate::config::ChannelConfig;
use crate::config::Destination;
use crate::config::load_config;
use crate::layout::TextLayout;
use crate::policy::RotationPolicy;
use crate::record::Level;
use crate::router::LevelRouter;
use crate::trap::DefaultTrap;

/// The name of the channel receiving {Panic, Fatal, Error} records from every channel.
pub const STDERR_CHANNEL: &str = "stderr";

/// The name of the channel receiving {Warn, Info, Debug} records from every channel, and the
/// fallback for unknown names.
pub const STDOUT_CHANNEL: &str = "stdout";

/// Named channels sharing one severity router.
///
/// A `stderr` and a `stdout` channel always exist: when the configuration does not declare them,
/// they are synthesized as hourly rolling files `stderr.log` (at [`Level::Error`]) and
/// `stdout.log` (at [`Level::Info`]) in the log directory, without size or retention limits.
///
/// # Examples
///
/// ```
/// use logforth_channel::Channels;
/// use logforth_channel::config::parse_config;
///
/// let dir = tempfile::tempdir().unwrap();
/// let configs = parse_config(
///     "<logging><filter><tag>app</tag><level>info</level><type>file</type></filter></logging>",
///     "inline",
/// )
/// .unwrap();
///
/// let channels = Channels::from_configs(dir.path(), configs).unwrap();
/// channels.get("app").info(format_args!("started"));
/// channels.flush();
///
/// assert!(dir.path().join("app.log").exists());
/// assert!(dir.path().join("stderr.log").exists());
/// assert!(dir.path().join("stdout.log").exists());
/// ```
#[derive(Debug)]
pub struct Channels {
    loggers: BTreeMap<String, Logger>,
}

impl Channels {
    /// Build channels from the configuration file at `config_path`, writing file channels into
    /// `log_dir`.
    ///
    /// # Errors
    ///
    /// Return an error if the configuration cannot be loaded or a sink cannot be constructed.
    pub fn init(log_dir: impl AsRef<Path>, config_path: impl AsRef<Path>) -> Result<Self, Error> {
        ChannelsBuilder::new(log_dir.as_ref()).load(config_path)
    }

    /// Build channels from already parsed configurations, writing file channels into `log_dir`.
    ///
    /// # Errors
    ///
    /// Return an error if a sink cannot be constructed.
    pub fn from_configs(
        log_dir: impl AsRef<Path>,
        configs: impl IntoIterator<Item = ChannelConfig>,
    ) -> Result<Self, Error> {
        ChannelsBuilder::new(log_dir.as_ref()).build(configs)
    }

    /// Return the handle registered under `name`.
    ///
    /// Unknown names resolve to the `stdout` channel, or to [`Logger::default`] if even that is
    /// missing. This never fails.
    pub fn get(&self, name: &str) -> Logger {
        self.loggers
            .get(name)
            .or_else(|| self.loggers.get(STDOUT_CHANNEL))
            .cloned()
            .unwrap_or_default()
    }

    /// Return whether a channel is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    /// Flush every channel.
    pub fn flush(&self) {
        for logger in self.loggers.values() {
            logger.flush();
        }
    }
}

/// A builder to configure and create [`Channels`].
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use logforth_channel::ChannelsBuilder;
/// use logforth_channel::layout::TextLayout;
///
/// let dir = tempfile::tempdir().unwrap();
/// let channels = ChannelsBuilder::new(dir.path())
///     .layout(TextLayout::default().timezone(TimeZone::UTC))
///     .build([])
///     .unwrap();
/// assert!(channels.contains("stderr"));
/// assert!(channels.contains("stdout"));
/// ```
#[must_use = "call `build` or `load` to construct the channels"]
#[derive(Debug)]
pub struct ChannelsBuilder {
    log_dir: PathBuf,
    layout: TextLayout,
    trap: Arc<dyn Trap>,
}

impl ChannelsBuilder {
    /// Create a builder writing file channels into `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            layout: TextLayout::default(),
            trap: Arc::new(DefaultTrap::default()),
        }
    }

    /// Set the layout shared by all channels.
    ///
    /// Default to [`TextLayout`] in the local time zone.
    pub fn layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the trap for errors that occur while writing or rotating.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        let trap: Box<dyn Trap> = trap.into();
        self.trap = Arc::from(trap);
        self
    }

    /// Load the configuration file at `config_path` and build the channels.
    ///
    /// # Errors
    ///
    /// Return an error if the configuration cannot be loaded or a sink cannot be constructed.
    pub fn load(self, config_path: impl AsRef<Path>) -> Result<Channels, Error> {
        let configs = load_config(config_path)?;
        self.build(configs)
    }

    /// Build the channels from `configs`.
    ///
    /// Disabled entries are skipped. A later entry with the same tag replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Return an error if a sink cannot be constructed.
    pub fn build(self, configs: impl IntoIterator<Item = ChannelConfig>) -> Result<Channels, Error> {
        let mut sinks: BTreeMap<String, (Level, Arc<dyn Append>)> = BTreeMap::new();
        for config in configs {
            if !config.enabled {
                continue;
            }
            let sink: Arc<dyn Append> = match config.destination {
                Destination::Console => {
                    Arc::new(Stdout::default().with_layout(self.layout.clone()))
                }
                Destination::File => {
                    let policy = RotationPolicy::from_properties(&config.properties);
                    let path = self.log_dir.join(format!("{}.log", config.tag));
                    let file = policy
                        .build_file_sink(path, self.layout.clone(), self.trap.clone())
                        .map_err(|err| err.with_context("tag", &config.tag))?;
                    Arc::new(file)
                }
            };
            sinks.insert(config.tag, (config.level, sink));
        }

        let stderr = self.resolve(&mut sinks, STDERR_CHANNEL, Level::Error)?;
        let stdout = self.resolve(&mut sinks, STDOUT_CHANNEL, Level::Info)?;
        let router = Arc::new(LevelRouter::standard(stderr, stdout));

        let loggers = sinks
            .into_iter()
            .map(|(name, (level, sink))| {
                let logger = Logger::new(
                    name.as_str(),
                    level,
                    sink,
                    router.clone(),
                    self.trap.clone(),
                );
                (name, logger)
            })
            .collect();
        Ok(Channels { loggers })
    }

    // Return the sink of `name`, synthesizing an unbounded file channel when it is missing.
    fn resolve(
        &self,
        sinks: &mut BTreeMap<String, (Level, Arc<dyn Append>)>,
        name: &str,
        level: Level,
    ) -> Result<Arc<dyn Append>, Error> {
        if let Some((_, sink)) = sinks.get(name) {
            return Ok(sink.clone());
        }

        let path = self.log_dir.join(format!("{name}.log"));
        let file = RotationPolicy::unbounded()
            .build_file_sink(path, self.layout.clone(), self.trap.clone())
            .map_err(|err| err.with_context("tag", name))?;
        let sink: Arc<dyn Append> = Arc::new(file);
        sinks.insert(name.to_string(), (level, sink.clone()));
        Ok(sink)
    }
}

static CHANNELS: RwLock<Option<Arc<Channels>>> = RwLock::new(None);

/// Build channels from `config_path` and publish them as the process-wide registry.
///
/// A successful call replaces any previously published registry, including its routing. On
/// failure the previous registry stays in place.
///
/// # Errors
///
/// Return an error if the configuration cannot be loaded or a sink cannot be constructed.
///
/// # Examples
///
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// let config = dir.path().join("log.xml");
/// std::fs::write(
///     &config,
///     "<logging><filter><tag>app</tag><level>debug</level><type>file</type></filter></logging>",
/// )
/// .unwrap();
///
/// logforth_channel::init_logger(dir.path(), &config).unwrap();
/// logforth_channel::get_logger("app").debug(format_args!("ready"));
/// ```
pub fn init_logger(log_dir: impl AsRef<Path>, config_path: impl AsRef<Path>) -> Result<(), Error> {
    let channels = Channels::init(log_dir, config_path)?;
    set_channels(channels);
    Ok(())
}

/// Publish `channels` as the process-wide registry, replacing any previous one.
pub fn set_channels(channels: Channels) {
    let channels = Some(Arc::new(channels));
    let previous = {
        let mut slot = CHANNELS.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, channels)
    };
    if let Some(previous) = previous {
        previous.flush();
    }
}

/// Return the process-wide handle for `name`.
///
/// Before [`init_logger`] succeeds this is [`Logger::default`]. See [`Channels::get`] for how
/// unknown names resolve.
pub fn get_logger(name: &str) -> Logger {
    let slot = CHANNELS.read().unwrap_or_else(|e| e.into_inner());
    match slot.as_ref() {
        Some(channels) => channels.get(name),
        None => Logger::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Property;

    fn config(tag: &str, level: Level, destination: Destination) -> ChannelConfig {
        ChannelConfig {
            tag: tag.to_string(),
            enabled: true,
            level,
            destination,
            properties: vec![],
        }
    }

    #[test]
    fn test_synthesized_channels() {
        let dir = tempfile::tempdir().unwrap();
        let channels = Channels::from_configs(dir.path(), []).unwrap();

        assert_eq!(channels.loggers.len(), 2);
        assert!(channels.contains("stderr"));
        assert!(channels.contains("stdout"));
        assert_eq!(channels.get("stderr").level(), Level::Error);
        assert_eq!(channels.get("stdout").level(), Level::Info);
    }

    #[test]
    fn test_lookup_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let channels = Channels::from_configs(
            dir.path(),
            [
                config("app", Level::Warn, Destination::File),
                config("stdout", Level::Debug, Destination::Console),
            ],
        )
        .unwrap();

        assert_eq!(channels.get("app").name(), "app");
        let fallback = channels.get("missing");
        assert_eq!(fallback.name(), "stdout");
        assert_eq!(fallback.level(), Level::Debug);

        let empty = Channels {
            loggers: BTreeMap::new(),
        };
        assert_eq!(empty.get("anything").name(), "default");
    }

    #[test]
    fn test_disabled_and_duplicate_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut disabled = config("off", Level::Info, Destination::File);
        disabled.enabled = false;
        let mut second = config("app", Level::Debug, Destination::File);
        second.properties.push(Property::new("maxbackups", "2"));

        let channels = Channels::from_configs(
            dir.path(),
            [disabled, config("app", Level::Error, Destination::File), second],
        )
        .unwrap();

        assert!(!channels.contains("off"));
        assert!(!dir.path().join("off.log").exists());
        assert_eq!(channels.get("app").level(), Level::Debug);
    }

    #[test]
    fn test_sink_construction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = Channels::from_configs(&blocker, [config("app", Level::Info, Destination::File)])
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SinkConstruction);
        assert_eq!(err.context("tag"), Some("app"));
    }
}
