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

//! Appender for writing log records to rolling files.
//!
//! # Example
//!
//!```
//! use std::num::NonZeroUsize;
//!
//! use logforth_channel::append::Append;
//! use logforth_channel::append::FileBuilder;
//! use logforth_channel::record::Record;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let rolling = FileBuilder::new(dir.path().join("app.log"))
//!     .rollover_size(NonZeroUsize::new(100 * 1024 * 1024).unwrap())
//!     .max_log_files(NonZeroUsize::new(10).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let record = Record::builder().channel("app").payload("Hello file!").build();
//! rolling.append(&record).unwrap();
//! ```

pub use self::append::File;
pub use self::append::FileBuilder;

mod append;
mod clock;
mod rolling;
mod rotation;
