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

use std::num::NonZeroUsize;
use std::path::Path;

use crate::Error;
use crate::ErrorKind;
use crate::Trap;
use crate::append::File;
use crate::append::FileBuilder;
use crate::config::Property;
use crate::layout::Layout;
use crate::size::parse_size;

/// Default number of backing files kept for a file channel.
pub const DEFAULT_MAX_BACKUPS: u64 = 10;

/// Default size threshold of a file channel, as a size string.
pub const DEFAULT_MAX_SIZE: &str = "100M";

/// Retention and size limits of an hourly rolling file sink.
///
/// A zero means "no limit" for both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// The maximum number of backing files kept.
    pub max_backups: u64,
    /// The size in bytes at which the current backing file is rolled over.
    pub max_size: i64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_backups: DEFAULT_MAX_BACKUPS,
            max_size: parse_size(DEFAULT_MAX_SIZE, 1024),
        }
    }
}

impl RotationPolicy {
    /// A policy without retention or size limits; files only roll over hourly.
    pub fn unbounded() -> Self {
        Self {
            max_backups: 0,
            max_size: 0,
        }
    }

    /// Create a policy from the defaults overridden by `maxbackups` and `maxsize` properties.
    ///
    /// A malformed `maxbackups` keeps the previous value, while a malformed `maxsize` disables
    /// size-based rotation. Other properties are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_channel::RotationPolicy;
    /// use logforth_channel::config::Property;
    ///
    /// let policy = RotationPolicy::from_properties(&[
    ///     Property::new("maxbackups", "3"),
    ///     Property::new("maxsize", " 16K\n"),
    /// ]);
    /// assert_eq!(policy.max_backups, 3);
    /// assert_eq!(policy.max_size, 16 * 1024);
    /// ```
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut policy = Self::default();
        for property in properties {
            let value = property.value.trim_matches([' ', '\r', '\n']);
            match property.name.as_str() {
                "maxbackups" => {
                    if let Ok(n) = value.parse::<u32>() {
                        policy.max_backups = u64::from(n);
                    }
                }
                "maxsize" => policy.max_size = parse_size(value, 1024),
                _ => {}
            }
        }
        policy
    }

    /// Build an hourly rolling file sink at `path` honoring this policy.
    ///
    /// # Errors
    ///
    /// Return a [`ErrorKind::SinkConstruction`] error if the file or its directory cannot be
    /// created.
    pub fn build_file_sink(
        &self,
        path: impl AsRef<Path>,
        layout: impl Into<Box<dyn Layout>>,
        trap: impl Into<Box<dyn Trap>>,
    ) -> Result<File, Error> {
        let path = path.as_ref();
        let mut builder = FileBuilder::new(path).layout(layout).trap(trap);

        if let Some(n) = usize::try_from(self.max_size).ok().and_then(NonZeroUsize::new) {
            builder = builder.rollover_size(n);
        }
        if let Some(n) = usize::try_from(self.max_backups)
            .ok()
            .and_then(NonZeroUsize::new)
        {
            builder = builder.max_log_files(n);
        }

        builder.build().map_err(|err| {
            if err.kind() == ErrorKind::SinkConstruction {
                err
            } else {
                Error::new(ErrorKind::SinkConstruction, "failed to build file sink")
                    .with_context("path", path.display())
                    .with_source(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_backups, 10);
        assert_eq!(policy.max_size, 100 * 1024 * 1024);
        assert_eq!(RotationPolicy::from_properties(&[]), policy);
    }

    #[test]
    fn test_policy_overrides() {
        let policy = RotationPolicy::from_properties(&[
            Property::new("maxbackups", "\r\n 4 \n"),
            Property::new("maxsize", "2G"),
            Property::new("compress", "true"),
        ]);
        assert_eq!(policy.max_backups, 4);
        assert_eq!(policy.max_size, 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_malformed_properties() {
        let policy = RotationPolicy::from_properties(&[
            Property::new("maxbackups", "many"),
            Property::new("maxsize", "big"),
        ]);
        assert_eq!(policy.max_backups, 10);
        assert_eq!(policy.max_size, 0);

        // the last well-formed value wins
        let policy = RotationPolicy::from_properties(&[
            Property::new("maxbackups", "5"),
            Property::new("maxbackups", "-1"),
        ]);
        assert_eq!(policy.max_backups, 5);
    }
}
