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

//! Declarative channel configuration.
//!
//! The configuration is an XML document with an arbitrary root element holding any number of
//! `filter` elements:
//!
//! ```xml
//! <logging>
//!   <filter enabled="true">
//!     <tag>app</tag>
//!     <level>info</level>
//!     <type>file</type>
//!     <property name="maxbackups">10</property>
//!     <property name="maxsize">100M</property>
//!   </filter>
//!   <filter enabled="true">
//!     <tag>console</tag>
//!     <level>debug</level>
//!     <type>console</type>
//!   </filter>
//! </logging>
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;
use crate::ErrorKind;
use crate::record::Level;

/// Where a channel writes its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The standard output stream.
    Console,
    /// An hourly rolling file named after the channel tag.
    File,
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(Destination::Console),
            "file" => Ok(Destination::File),
            _ => Err(Error::new(
                ErrorKind::ConfigParse,
                format!("unknown destination type: {s:?}"),
            )),
        }
    }
}

/// A destination-specific override, such as `maxbackups` for file channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// The property name.
    pub name: String,
    /// The raw property value.
    pub value: String,
}

impl Property {
    /// Create a new property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One parsed `filter` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// The channel name, also the base name of its log file.
    pub tag: String,
    /// Whether the filter is enabled. Disabled filters are dropped by [`load_config`].
    pub enabled: bool,
    /// The minimum severity the channel accepts.
    pub level: Level,
    /// Where the channel writes.
    pub destination: Destination,
    /// Destination-specific properties, in document order.
    pub properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default, rename = "filter")]
    filters: Vec<RawFilter>,
}

#[derive(Debug, Deserialize)]
struct RawFilter {
    #[serde(default, rename = "@enabled")]
    enabled: Option<String>,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    level: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, rename = "property")]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(default, rename = "@name")]
    name: String,
    #[serde(default, rename = "$text")]
    value: String,
}

impl RawFilter {
    fn is_enabled(&self) -> bool {
        !self
            .enabled
            .as_deref()
            .is_some_and(|enabled| enabled.trim().eq_ignore_ascii_case("false"))
    }

    fn validate(self, source: &str) -> Result<ChannelConfig, Error> {
        let enabled = self.is_enabled();
        let tag = self.tag.trim().to_string();
        if tag.is_empty() {
            return Err(
                Error::new(ErrorKind::ConfigParse, "filter has an empty tag")
                    .with_context("source", source),
            );
        }

        let level = Level::from_str(self.level.trim()).map_err(|err| {
            Error::new(err.kind(), err.message())
                .with_context("source", source)
                .with_context("tag", &tag)
        })?;

        let destination = Destination::from_str(self.kind.trim()).map_err(|err| {
            Error::new(err.kind(), err.message())
                .with_context("source", source)
                .with_context("tag", &tag)
        })?;

        let properties = self
            .properties
            .into_iter()
            .map(|property| Property::new(property.name.trim(), property.value))
            .collect();

        Ok(ChannelConfig {
            tag,
            enabled,
            level,
            destination,
            properties,
        })
    }
}

/// Parse channel configurations from an XML document.
///
/// `source` names the document in error context, typically its path.
///
/// Disabled filters are skipped. The remaining ones are returned in document order.
///
/// # Errors
///
/// * [`ErrorKind::ConfigParse`] if the markup is malformed, a tag is empty, or a type is neither
///   `console` nor `file`.
/// * [`ErrorKind::InvalidLevel`] if a level is not a known severity.
///
/// # Examples
///
/// ```
/// use logforth_channel::config::Destination;
/// use logforth_channel::config::parse_config;
/// use logforth_channel::record::Level;
///
/// let configs = parse_config(
///     "<logging><filter><tag>app</tag><level>warn</level><type>file</type></filter></logging>",
///     "inline",
/// )
/// .unwrap();
/// assert_eq!(configs[0].tag, "app");
/// assert_eq!(configs[0].level, Level::Warn);
/// assert_eq!(configs[0].destination, Destination::File);
/// ```
pub fn parse_config(text: &str, source: &str) -> Result<Vec<ChannelConfig>, Error> {
    let raw: RawConfig = quick_xml::de::from_str(text).map_err(|err| {
        Error::new(ErrorKind::ConfigParse, "failed to parse XML configuration")
            .with_context("source", source)
            .with_source(err)
    })?;

    let mut configs = Vec::with_capacity(raw.filters.len());
    for filter in raw.filters {
        if !filter.is_enabled() {
            continue;
        }
        configs.push(filter.validate(source)?);
    }
    Ok(configs)
}

/// Load channel configurations from the XML file at `path`.
///
/// # Errors
///
/// * [`ErrorKind::ConfigIo`] if the file cannot be opened or read.
/// * Any error of [`parse_config`].
pub fn load_config(path: impl AsRef<Path>) -> Result<Vec<ChannelConfig>, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        Error::new(ErrorKind::ConfigIo, "failed to read configuration")
            .with_context("path", path.display())
            .with_source(err)
    })?;
    let text = String::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::ConfigParse, "configuration is not valid UTF-8")
            .with_context("path", path.display())
            .with_source(err)
    })?;

    parse_config(&text, &path.display().to_string())
}
