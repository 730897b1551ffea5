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

//! Named logging channels configured from an XML file.
//!
//! # Overview
//!
//! Each `filter` entry of the configuration declares a channel: a name, a minimum severity, and a
//! destination, either the console or an hourly rolling file `{log_dir}/{tag}.log`. Every channel
//! additionally copies {Panic, Fatal, Error} records to the `stderr` channel and {Warn, Info,
//! Debug} records to the `stdout` channel; both are synthesized as rolling files when the
//! configuration omits them.
//!
//! # Examples
//!
//! Build the channels as an explicit object:
//!
//! ```
//! use logforth_channel::Channels;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = dir.path().join("log.xml");
//! std::fs::write(
//!     &config,
//!     r#"<logging>
//!   <filter enabled="true">
//!     <tag>app</tag>
//!     <level>info</level>
//!     <type>file</type>
//!     <property name="maxbackups">10</property>
//!     <property name="maxsize">100M</property>
//!   </filter>
//! </logging>"#,
//! )
//! .unwrap();
//!
//! let channels = Channels::init(dir.path(), &config).unwrap();
//! let app = channels.get("app");
//! app.info(format_args!("listening on port {}", 8080));
//! app.error(format_args!("also written to stderr.log"));
//! ```
//!
//! Or publish them process-wide:
//!
//! ```
//! # let dir = tempfile::tempdir().unwrap();
//! # let config = dir.path().join("log.xml");
//! # std::fs::write(&config, "<logging/>").unwrap();
//! logforth_channel::init_logger(dir.path(), &config).unwrap();
//! logforth_channel::get_logger("stdout").info(format_args!("ready"));
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod config;
pub mod layout;
pub mod record;
pub mod router;
pub mod trap;

#[cfg(feature = "bridge-log")]
pub mod bridge;

mod error;
mod logger;
mod policy;
mod registry;
mod size;

pub use self::append::Append;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::layout::Layout;
pub use self::logger::Logger;
pub use self::policy::DEFAULT_MAX_BACKUPS;
pub use self::policy::DEFAULT_MAX_SIZE;
pub use self::policy::RotationPolicy;
pub use self::registry::Channels;
pub use self::registry::ChannelsBuilder;
pub use self::registry::STDERR_CHANNEL;
pub use self::registry::STDOUT_CHANNEL;
pub use self::registry::get_logger;
pub use self::registry::init_logger;
pub use self::registry::set_channels;
pub use self::size::parse_size;
pub use self::trap::Trap;
